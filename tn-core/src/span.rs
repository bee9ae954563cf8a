//! # Regra Compartilhada de Varredura de Spans
//!
//! A reconstrução do texto exige **duas** varreduras da mesma sequência de
//! tags: uma para extrair os pedidos de reescrita ([`crate::extract`]) e
//! outra para montar o texto final ([`crate::assemble`]). Qualquer
//! divergência entre as duas varreduras corrompe o texto silenciosamente,
//! porque o consumo das respostas do reescritor é posicional (cursor).
//!
//! Por isso a regra de fronteira existe em **um único lugar**: a função
//! [`scan_spans`]. As duas varreduras chamam a mesma função e, portanto,
//! enxergam exatamente as mesmas fronteiras.
//!
//! ## A regra
//!
//! 1. O índice 0 é sempre o marcador de início (BOS) e nunca entra em span;
//!    a varredura começa no índice 1.
//! 2. A varredura para no primeiro token igual ao marcador de fim (EOS) ou
//!    em `valid_length`, o que vier primeiro.
//! 3. Um span abre no primeiro token considerado e sempre que a categoria
//!    da tag atual difere da categoria do span aberto. A decisão usa a
//!    **categoria**, não a tag crua: `B-M` depois de um span `Outer` fecha
//!    o span e abre um novo `Rewrite`; `B-I` dentro de um span `Rewrite`
//!    apenas o estende (spans são corridas máximas de uma categoria).
//! 4. Um span ainda aberto no ponto de parada é fechado ali
//!    (fechamento forçado).

use serde::{Deserialize, Serialize};

use crate::tag::{SpanCategory, Tag};
use crate::TokenId;

/// Um span de tokens `[start, end)` com categoria única.
///
/// Invariantes garantidas por [`scan_spans`]: `start >= 1` (o BOS nunca
/// entra), `end > start` e `end` não ultrapassa o ponto de parada da
/// varredura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Índice do primeiro token (inclusivo)
    pub start: usize,
    /// Índice após o último token (exclusivo)
    pub end: usize,
    /// Categoria do span: copiar ou reescrever
    pub category: SpanCategory,
}

impl Span {
    /// Quantidade de tokens cobertos pelo span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Varre uma sequência de tags e devolve os spans na ordem do texto.
///
/// Esta é a máquina de estados canônica do pós-processamento; extração e
/// montagem dependem de chamá-la com os mesmos argumentos para produzir
/// exatamente a mesma lista.
///
/// # Argumentos
/// - `tags`: uma tag por token, alinhada com `tokens`.
/// - `tokens`: ids de token do exemplo; índice 0 é o BOS.
/// - `valid_length`: limite superior (exclusivo) das posições válidas,
///   cobrindo o EOS quando presente. Valores maiores que a linha são
///   truncados; `valid_length <= 1` produz lista vazia.
/// - `eos_id`: id do marcador de fim; o primeiro token igual a ele encerra
///   a varredura.
///
/// # Exemplo
/// Tags `[O-I, O-I, B-I, B-M, O-I]` sobre `[BOS, "the", "5", "5", "dogs", EOS]`
/// produzem `[Outer 1..2, Rewrite 2..4, Outer 4..5]`.
pub fn scan_spans(tags: &[Tag], tokens: &[TokenId], valid_length: usize, eos_id: TokenId) -> Vec<Span> {
    let limit = valid_length.min(tags.len()).min(tokens.len());
    let mut spans = Vec::new();
    if limit <= 1 {
        return spans;
    }

    let mut open: Option<(usize, SpanCategory)> = None;
    let mut stop = limit;

    for i in 1..limit {
        if tokens[i] == eos_id {
            stop = i;
            break;
        }
        let category = tags[i].category();
        match open {
            Some((start, open_category)) if open_category != category => {
                spans.push(Span {
                    start,
                    end: i,
                    category: open_category,
                });
                open = Some((i, category));
            }
            Some(_) => {}
            None => open = Some((i, category)),
        }
    }

    // Fechamento forçado: EOS ausente ou span encostado no fim válido
    if let Some((start, category)) = open {
        spans.push(Span {
            start,
            end: stop,
            category,
        });
    }

    spans
}
