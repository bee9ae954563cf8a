//! # Pipeline de Pós-processamento — Orquestrador por Lote
//!
//! Coordena as duas varreduras e os dois colaboradores externos
//! (detokenizador e reescritor de spans) para transformar um lote de
//! previsões do tagger em texto reconstruído por exemplo.
//!
//! ## Fluxo de um lote
//!
//! 1. **Extração** ([`crate::extract`]): varre todos os exemplos e produz a
//!    lista ordenada de pedidos de reescrita.
//! 2. **Reescrita**: o reescritor é invocado **uma única vez** com a lista
//!    inteira; a resposta `k` responde ao pedido `k`. Com zero pedidos o
//!    reescritor não é chamado (fallback todo-verbatim, e evita lote vazio
//!    degenerado no colaborador numérico).
//! 3. **Montagem** ([`crate::assemble`]): varre os exemplos de novo, na
//!    mesma ordem de linha, consumindo as respostas pelo cursor
//!    compartilhado e registrando os fragmentos no acumulador
//!    (primeiro a escrever vence).
//!
//! O processamento é síncrono e sequencial dentro do lote — a corretude
//! depende do avanço estritamente ordenado do cursor. Entre lotes, o único
//! estado é o [`ResultAccumulator`], que pertence ao passe inteiro.

use crate::assemble::{assemble_example, Detokenizer};
use crate::batch::{SequenceMarkers, TaggedBatch};
use crate::error::TnError;
use crate::extract::{extract_requests, RewriteRequest};
use crate::results::ResultAccumulator;

/// Reescritor de spans externo (colaborador fora de escopo).
///
/// Contrato lista-em/lista-fora: devolve uma string por pedido, no mesmo
/// tamanho e na mesma ordem. Pode paralelizar ou re-agrupar internamente,
/// mas expõe uma chamada síncrona e atômica por lote.
pub trait SpanRewriter {
    fn rewrite(&self, requests: &[RewriteRequest]) -> Vec<String>;
}

/// O pipeline de pós-processamento.
///
/// Dono dos dois colaboradores e dos ids de marcador; o acumulador de
/// resultados é passado explicitamente a cada chamada, deixando claro que
/// ele atravessa exatamente um passe de avaliação/inferência.
pub struct TnPipeline<D: Detokenizer, R: SpanRewriter> {
    detokenizer: D,
    rewriter: R,
    markers: SequenceMarkers,
}

impl<D: Detokenizer, R: SpanRewriter> TnPipeline<D, R> {
    pub fn new(detokenizer: D, rewriter: R, markers: SequenceMarkers) -> Self {
        Self {
            detokenizer,
            rewriter,
            markers,
        }
    }

    pub fn markers(&self) -> SequenceMarkers {
        self.markers
    }

    /// Processa um lote completo, registrando cada exemplo no acumulador.
    ///
    /// Erros estruturais (lote malformado, âncoras inválidas, contagem ou
    /// subfluxo de respostas do reescritor) abortam apenas este lote; o
    /// acumulador fica como estava antes dos exemplos ainda não inseridos.
    pub fn process_batch(
        &self,
        batch: &TaggedBatch,
        accumulator: &mut ResultAccumulator,
    ) -> Result<(), TnError> {
        batch.validate()?;

        let requests = extract_requests(batch, &self.markers, accumulator)?;

        let rewritten: Vec<String> = if requests.is_empty() {
            Vec::new()
        } else {
            let responses = self.rewriter.rewrite(&requests);
            if responses.len() != requests.len() {
                return Err(TnError::RewriteCountMismatch {
                    requested: requests.len(),
                    returned: responses.len(),
                });
            }
            responses
        };

        let mut cursor = 0usize;
        for row in 0..batch.len() {
            let example_id = batch.example_ids[row];
            // Deduplicação: mesma regra da extração — id já montado (neste
            // lote ou em anteriores) é pulado sem tocar no cursor
            if accumulator.contains(example_id) {
                continue;
            }
            let fragments = assemble_example(
                &batch.tags[row],
                &batch.tokens[row],
                batch.valid_lengths[row],
                &self.markers,
                &rewritten,
                &mut cursor,
                &self.detokenizer,
            )?;
            accumulator.insert(example_id, fragments);
        }

        // As duas varreduras compartilham regra e deduplicação, então todo
        // pedido tem exatamente um consumidor
        debug_assert_eq!(cursor, rewritten.len());

        Ok(())
    }

    /// Processa uma sequência de lotes de um mesmo passe.
    ///
    /// Um lote que falha aborta apenas a si próprio; os demais continuam.
    /// Devolve os índices dos lotes que falharam com seus erros.
    pub fn run_pass<'a, I>(
        &self,
        batches: I,
        accumulator: &mut ResultAccumulator,
    ) -> Vec<(usize, TnError)>
    where
        I: IntoIterator<Item = &'a TaggedBatch>,
    {
        let mut failures = Vec::new();
        for (index, batch) in batches.into_iter().enumerate() {
            if let Err(err) = self.process_batch(batch, accumulator) {
                failures.push((index, err));
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use crate::TokenId;
    use std::cell::Cell;

    const BOS: TokenId = 1;
    const EOS: TokenId = 2;

    fn markers() -> SequenceMarkers {
        SequenceMarkers::new(BOS, EOS)
    }

    fn tags(labels: &[&str]) -> Vec<Tag> {
        labels.iter().map(|l| Tag::from_label(l).unwrap()).collect()
    }

    struct TestDetok;

    impl Detokenizer for TestDetok {
        fn ids_to_text(&self, ids: &[TokenId]) -> String {
            ids.iter()
                .map(|id| match id {
                    10 => "the",
                    20 => "5",
                    30 => "dogs",
                    40 => "cost",
                    _ => "?",
                })
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    /// Reescritor de teste: numeral "5" vira "five"; conta as invocações.
    struct TestRewriter {
        calls: Cell<usize>,
        short_by: usize,
    }

    impl TestRewriter {
        fn new() -> Self {
            Self { calls: Cell::new(0), short_by: 0 }
        }

        fn misbehaving(short_by: usize) -> Self {
            Self { calls: Cell::new(0), short_by }
        }
    }

    impl SpanRewriter for TestRewriter {
        fn rewrite(&self, requests: &[RewriteRequest]) -> Vec<String> {
            self.calls.set(self.calls.get() + 1);
            let n = requests.len() - self.short_by;
            requests[..n]
                .iter()
                .map(|req| {
                    if req.tokens == vec![20, 20] {
                        "fifty five".to_string()
                    } else if req.tokens == vec![20] {
                        "five".to_string()
                    } else {
                        "<unk>".to_string()
                    }
                })
                .collect()
        }
    }

    fn pipeline() -> TnPipeline<TestDetok, TestRewriter> {
        TnPipeline::new(TestDetok, TestRewriter::new(), markers())
    }

    fn boundary_batch() -> TaggedBatch {
        TaggedBatch {
            tags: vec![tags(&["O-I", "O-I", "B-I", "B-M", "O-I", "O-I"])],
            tokens: vec![vec![BOS, 10, 20, 20, 30, EOS]],
            valid_lengths: vec![6],
            example_ids: vec![0],
        }
    }

    #[test]
    fn test_single_batch_end_to_end() {
        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&boundary_batch(), &mut acc).unwrap();
        assert_eq!(
            acc.get(0),
            Some(&["the".to_string(), "fifty five".to_string(), "dogs".to_string()][..])
        );
    }

    #[test]
    fn test_rewriter_not_called_without_requests() {
        let detok = TestDetok;
        let rewriter = TestRewriter::new();
        let batch = TaggedBatch {
            tags: vec![tags(&["O-I", "O-I", "O-I", "O-I"])],
            tokens: vec![vec![BOS, 10, 30, EOS]],
            valid_lengths: vec![4],
            example_ids: vec![0],
        };
        let pipe = TnPipeline::new(detok, rewriter, markers());
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&batch, &mut acc).unwrap();
        assert_eq!(pipe.rewriter.calls.get(), 0);
        assert_eq!(acc.get(0), Some(&["the dogs".to_string()][..]));
    }

    #[test]
    fn test_cursor_alignment_across_rows() {
        // Linha sem reescrita entre duas com reescrita: consumo em ordem
        let batch = TaggedBatch {
            tags: vec![
                tags(&["O-I", "O-I", "B-I", "O-I"]),
                tags(&["O-I", "O-I", "O-I", "O-I"]),
                tags(&["O-I", "B-I", "B-M", "O-I"]),
            ],
            tokens: vec![
                vec![BOS, 40, 20, EOS],
                vec![BOS, 10, 30, EOS],
                vec![BOS, 20, 20, EOS],
            ],
            valid_lengths: vec![4, 4, 4],
            example_ids: vec![0, 1, 2],
        };
        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&batch, &mut acc).unwrap();
        assert_eq!(acc.get(0), Some(&["cost".to_string(), "five".to_string()][..]));
        assert_eq!(acc.get(1), Some(&["the dogs".to_string()][..]));
        assert_eq!(acc.get(2), Some(&["fifty five".to_string()][..]));
    }

    #[test]
    fn test_duplicate_id_across_batches_is_idempotent() {
        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&boundary_batch(), &mut acc).unwrap();
        let before = acc.get(0).unwrap().to_vec();

        // Segundo lote reapresenta o id 0 com outro conteúdo e traz o id 1
        let batch = TaggedBatch {
            tags: vec![
                tags(&["O-I", "B-I", "O-I"]),
                tags(&["O-I", "B-I", "O-I"]),
            ],
            tokens: vec![vec![BOS, 20, EOS], vec![BOS, 20, EOS]],
            valid_lengths: vec![3, 3],
            example_ids: vec![0, 1],
        };
        pipe.process_batch(&batch, &mut acc).unwrap();

        // Primeiro a escrever vence: entrada do id 0 intacta byte a byte
        assert_eq!(acc.get(0).unwrap(), before.as_slice());
        // E o id 1 consumiu a resposta certa, sem desalinhamento
        assert_eq!(acc.get(1), Some(&["five".to_string()][..]));
    }

    #[test]
    fn test_duplicate_id_within_batch_first_wins() {
        let batch = TaggedBatch {
            tags: vec![
                tags(&["O-I", "B-I", "O-I"]),
                tags(&["O-I", "O-I", "O-I"]),
            ],
            tokens: vec![vec![BOS, 20, EOS], vec![BOS, 10, EOS]],
            valid_lengths: vec![3, 3],
            example_ids: vec![5, 5],
        };
        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&batch, &mut acc).unwrap();
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get(5), Some(&["five".to_string()][..]));
    }

    #[test]
    fn test_count_mismatch_is_fatal() {
        let pipe = TnPipeline::new(TestDetok, TestRewriter::misbehaving(1), markers());
        let mut acc = ResultAccumulator::new();
        let err = pipe.process_batch(&boundary_batch(), &mut acc).unwrap_err();
        assert_eq!(err, TnError::RewriteCountMismatch { requested: 1, returned: 0 });
        assert!(acc.is_empty());
    }

    #[test]
    fn test_ragged_batch_is_fatal() {
        let mut batch = boundary_batch();
        batch.valid_lengths.push(6);
        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        let err = pipe.process_batch(&batch, &mut acc).unwrap_err();
        assert!(matches!(err, TnError::RaggedBatch { field: "valid_lengths", .. }));
    }

    #[test]
    fn test_run_pass_continues_after_failed_batch() {
        let good_a = boundary_batch();
        let mut bad = boundary_batch();
        bad.example_ids = vec![1];
        bad.tokens.push(vec![BOS, EOS]); // malformado
        let mut good_b = boundary_batch();
        good_b.example_ids = vec![2];

        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        let failures = pipe.run_pass([&good_a, &bad, &good_b], &mut acc);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
        assert!(acc.contains(0));
        assert!(!acc.contains(1));
        assert!(acc.contains(2));
    }

    #[test]
    fn test_empty_example_in_batch() {
        // valid_length <= 1: lista de fragmentos vazia, sem erro
        let batch = TaggedBatch {
            tags: vec![tags(&["O-I"]), tags(&["O-I", "B-I", "O-I"])],
            tokens: vec![vec![BOS], vec![BOS, 20, EOS]],
            valid_lengths: vec![1, 3],
            example_ids: vec![0, 1],
        };
        let pipe = pipeline();
        let mut acc = ResultAccumulator::new();
        pipe.process_batch(&batch, &mut acc).unwrap();
        assert_eq!(acc.get(0), Some(&[][..]));
        assert_eq!(acc.get(1), Some(&["five".to_string()][..]));
    }
}
