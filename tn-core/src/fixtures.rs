//! # Fixtures de Demonstração
//!
//! Dados prontos e colaboradores de mentira para o servidor de demonstração
//! e para testes: um vocabulário mínimo, um detokenizador por tabela e um
//! reescritor por dicionário. Os modelos neurais reais (tagger contextual e
//! seq2seq de reescrita) ficam fora deste repositório; estes substitutos
//! respeitam os mesmos contratos ([`Detokenizer`] e [`SpanRewriter`]).

use std::collections::HashMap;

use crate::assemble::Detokenizer;
use crate::batch::{SequenceMarkers, TaggedBatch};
use crate::extract::RewriteRequest;
use crate::pipeline::SpanRewriter;
use crate::tag::Tag;
use crate::TokenId;

/// Id do BOS no vocabulário de demonstração
pub const DEMO_BOS: TokenId = 1;
/// Id do EOS no vocabulário de demonstração
pub const DEMO_EOS: TokenId = 2;

/// Marcadores usados pelo vocabulário de demonstração
pub fn demo_markers() -> SequenceMarkers {
    SequenceMarkers::new(DEMO_BOS, DEMO_EOS)
}

/// Detokenizador por tabela: cada id vira uma palavra, unidas por espaço.
///
/// Ids desconhecidos viram `<unk>`; entrada vazia devolve string vazia,
/// como o contrato exige.
#[derive(Debug, Clone, Default)]
pub struct VocabDetokenizer {
    vocab: HashMap<TokenId, String>,
}

impl VocabDetokenizer {
    pub fn new(vocab: HashMap<TokenId, String>) -> Self {
        Self { vocab }
    }
}

impl Detokenizer for VocabDetokenizer {
    fn ids_to_text(&self, ids: &[TokenId]) -> String {
        ids.iter()
            .map(|id| {
                self.vocab
                    .get(id)
                    .map(|w| w.as_str())
                    .unwrap_or("<unk>")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Reescritor por dicionário: a sequência literal de ids é a chave.
///
/// Spans fora do dicionário são devolvidos detokenizados sem alteração,
/// para que a demonstração nunca perca texto.
#[derive(Debug, Clone, Default)]
pub struct LookupRewriter {
    table: HashMap<Vec<TokenId>, String>,
    fallback: VocabDetokenizer,
}

impl LookupRewriter {
    pub fn new(table: HashMap<Vec<TokenId>, String>, fallback: VocabDetokenizer) -> Self {
        Self { table, fallback }
    }
}

impl SpanRewriter for LookupRewriter {
    fn rewrite(&self, requests: &[RewriteRequest]) -> Vec<String> {
        requests
            .iter()
            .map(|req| {
                self.table
                    .get(&req.tokens)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.ids_to_text(&req.tokens))
            })
            .collect()
    }
}

/// Vocabulário mínimo de demonstração (ids 10..).
pub fn demo_vocab() -> HashMap<TokenId, String> {
    [
        (10, "the"),
        (11, "at"),
        (12, "on"),
        (20, "5"),
        (21, "55"),
        (22, "1984"),
        (30, "dogs"),
        (31, "pm"),
        (32, "arrived"),
    ]
    .into_iter()
    .map(|(id, w)| (id, w.to_string()))
    .collect()
}

/// Dicionário de reescrita de demonstração (numerais → extenso).
pub fn demo_rewrites() -> HashMap<Vec<TokenId>, String> {
    [
        (vec![20], "five"),
        (vec![20, 20], "fifty five"),
        (vec![21], "fifty five"),
        (vec![22], "nineteen eighty four"),
        (vec![20, 31], "five p m"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect()
}

/// Lote de demonstração com três exemplos:
/// um com reescrita no meio, um todo-verbatim e um com reescrita encostada
/// no fim válido (fechamento forçado, sem EOS).
pub fn demo_batch() -> TaggedBatch {
    let t = |labels: &[&str]| -> Vec<Tag> {
        labels.iter().map(|l| Tag::from_label(l).expect("label fixo")).collect()
    };
    TaggedBatch {
        tags: vec![
            t(&["O-I", "O-I", "B-I", "B-M", "O-I", "O-I"]),
            t(&["O-I", "O-I", "O-M", "O-I"]),
            t(&["O-I", "O-I", "O-I", "B-I", "B-M"]),
        ],
        tokens: vec![
            vec![DEMO_BOS, 10, 20, 20, 30, DEMO_EOS],
            vec![DEMO_BOS, 10, 30, DEMO_EOS],
            vec![DEMO_BOS, 32, 11, 20, 31],
        ],
        valid_lengths: vec![6, 4, 5],
        example_ids: vec![0, 1, 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TnPipeline;
    use crate::results::ResultAccumulator;

    #[test]
    fn test_demo_batch_end_to_end() {
        let pipe = TnPipeline::new(
            VocabDetokenizer::new(demo_vocab()),
            LookupRewriter::new(demo_rewrites(), VocabDetokenizer::new(demo_vocab())),
            demo_markers(),
        );
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&demo_batch(), &mut acc).unwrap();

        assert_eq!(acc.joined(0).as_deref(), Some("the fifty five dogs"));
        assert_eq!(acc.joined(1).as_deref(), Some("the dogs"));
        assert_eq!(acc.joined(2).as_deref(), Some("arrived at five p m"));
    }

    #[test]
    fn test_detokenizer_empty_input() {
        let detok = VocabDetokenizer::new(demo_vocab());
        assert_eq!(detok.ids_to_text(&[]), "");
    }

    #[test]
    fn test_lookup_rewriter_fallback() {
        let rewriter = LookupRewriter::new(demo_rewrites(), VocabDetokenizer::new(demo_vocab()));
        let requests = vec![RewriteRequest {
            row: 0,
            left_anchor: 0,
            right_anchor: 2,
            tokens: vec![30],
        }];
        assert_eq!(rewriter.rewrite(&requests), vec!["dogs".to_string()]);
    }
}
