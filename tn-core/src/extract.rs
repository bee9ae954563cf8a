//! # Extração de Pedidos de Reescrita (primeira varredura)
//!
//! Varre cada exemplo do lote com a regra compartilhada de
//! [`crate::span::scan_spans`] e emite, na ordem das linhas, um
//! [`RewriteRequest`] por span de categoria `Rewrite`. Spans `Outer` não
//! são emitidos — a montagem os recalcula de forma independente com a
//! mesma regra, então entre as duas varreduras só cruzam a lista ordenada
//! de pedidos e a lista ordenada de respostas.
//!
//! As âncoras `left_anchor = start - 1` e `right_anchor = end` apontam os
//! tokens imediatamente fora do span; o reescritor as usa como contexto,
//! mas elas não entram na entrada literal (`tokens[start..end]`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::batch::{SequenceMarkers, TaggedBatch};
use crate::error::TnError;
use crate::results::ResultAccumulator;
use crate::span::scan_spans;
use crate::tag::SpanCategory;
use crate::{ExampleId, TokenId};

/// Um span a reescrever, com as âncoras de contexto que o reescritor exige.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    /// Linha do exemplo dentro do lote
    pub row: usize,
    /// Índice do token imediatamente antes do span (contexto esquerdo)
    pub left_anchor: usize,
    /// Índice do token imediatamente após o span (contexto direito)
    pub right_anchor: usize,
    /// Entrada literal do reescritor: `tokens[start..end]`
    pub tokens: Vec<TokenId>,
}

/// Extrai os pedidos de reescrita de um lote inteiro, em ordem de linha.
///
/// Exemplos cujo id já está no acumulador — ou que já apareceram em uma
/// linha anterior do **mesmo** lote — são pulados por inteiro, espelhando a
/// regra de deduplicação da montagem; é isso que mantém o cursor alinhado.
/// Um exemplo sem spans `Rewrite` contribui com zero pedidos sem perturbar
/// a numeração dos seguintes.
pub fn extract_requests(
    batch: &TaggedBatch,
    markers: &SequenceMarkers,
    done: &ResultAccumulator,
) -> Result<Vec<RewriteRequest>, TnError> {
    let mut requests = Vec::new();
    let mut seen_in_batch: HashSet<ExampleId> = HashSet::new();

    for row in 0..batch.len() {
        let example_id = batch.example_ids[row];
        if done.contains(example_id) || !seen_in_batch.insert(example_id) {
            continue;
        }

        let spans = scan_spans(
            &batch.tags[row],
            &batch.tokens[row],
            batch.valid_lengths[row],
            markers.eos_id,
        );

        for span in spans {
            if span.category != SpanCategory::Rewrite {
                continue;
            }
            let left_anchor = span.start - 1;
            let right_anchor = span.end;
            if left_anchor >= right_anchor {
                return Err(TnError::InvalidAnchors {
                    row,
                    left: left_anchor,
                    right: right_anchor,
                });
            }
            requests.push(RewriteRequest {
                row,
                left_anchor,
                right_anchor,
                tokens: batch.tokens[row][span.start..span.end].to_vec(),
            });
        }
    }

    Ok(requests)
}
