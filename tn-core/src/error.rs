//! # Erros do Pós-processamento
//!
//! A taxonomia separa violações **estruturais** (quebra de contrato com o
//! tagger ou com o reescritor — fatais para o lote corrente) de condições
//! benignas de fronteira (EOS ausente, exemplo sem tokens válidos, lote sem
//! pedidos de reescrita, id de exemplo repetido), que são tratadas pelo
//! comportamento documentado e **nunca** viram erro.

use thiserror::Error;

/// Erro fatal de processamento de um lote.
///
/// Qualquer variante aborta apenas o lote corrente; lotes seguintes de um
/// mesmo passe são independentes e podem continuar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TnError {
    /// Âncoras malformadas em um pedido de reescrita. Inalcançável se a
    /// regra de varredura estiver correta; falha alto em vez de emitir um
    /// pedido corrompido.
    #[error(
        "âncoras inválidas na linha {row}: left_anchor {left} deve ser menor que right_anchor {right}"
    )]
    InvalidAnchors { row: usize, left: usize, right: usize },

    /// O reescritor devolveu uma lista de tamanho diferente da lista de
    /// pedidos (contrato lista-em/lista-fora, mesma ordem e tamanho).
    #[error("reescritor devolveu {returned} strings para {requested} pedidos")]
    RewriteCountMismatch { requested: usize, returned: usize },

    /// A montagem precisou de mais respostas do que o reescritor devolveu
    /// (cursor desalinhado); nunca ler além da lista.
    #[error("lista de reescritas curta: necessário {needed}, disponível {provided}")]
    RewriteUnderrun { needed: usize, provided: usize },

    /// Os campos do lote têm quantidades de linhas divergentes.
    #[error("lote malformado: campo `{field}` tem {found} linhas, esperado {expected}")]
    RaggedBatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}
