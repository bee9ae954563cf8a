//! # Lote de Entrada
//!
//! Estruturas que chegam do componente de tagging/dataset (fora de escopo):
//! tags previstas, ids de token, comprimentos válidos e ids de exemplo,
//! uma linha por exemplo. Para este núcleo o lote é **somente leitura**.

use serde::{Deserialize, Serialize};

use crate::error::TnError;
use crate::tag::Tag;
use crate::{ExampleId, TokenId};

/// Ids dos marcadores de fronteira de sequência.
///
/// O BOS ocupa por contrato o índice 0 de cada linha; o EOS encerra a
/// varredura quando encontrado antes de `valid_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMarkers {
    /// Id do marcador de início de sequência
    pub bos_id: TokenId,
    /// Id do marcador de fim de sequência
    pub eos_id: TokenId,
}

impl SequenceMarkers {
    pub fn new(bos_id: TokenId, eos_id: TokenId) -> Self {
        Self { bos_id, eos_id }
    }
}

/// Um lote de exemplos já passados pelo tagger contextual.
///
/// Os quatro campos são paralelos: a linha `i` de cada um descreve o mesmo
/// exemplo. `valid_lengths[i]` limita as posições significativas da linha
/// (inclui o EOS quando presente, exclui padding); `example_ids[i]` é um
/// identificador opaco, estável entre lotes, usado como chave do
/// acumulador de resultados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedBatch {
    /// Uma tag por token, por exemplo
    pub tags: Vec<Vec<Tag>>,
    /// Ids de token por exemplo; índice 0 = BOS
    pub tokens: Vec<Vec<TokenId>>,
    /// Limite (exclusivo) das posições válidas de cada exemplo
    pub valid_lengths: Vec<usize>,
    /// Identificador opaco de cada exemplo
    pub example_ids: Vec<ExampleId>,
}

impl TaggedBatch {
    /// Quantidade de exemplos no lote
    pub fn len(&self) -> usize {
        self.example_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.example_ids.is_empty()
    }

    /// Verifica que os campos paralelos têm a mesma quantidade de linhas.
    ///
    /// A versão original confiava no shape dos tensores; aqui o desacordo é
    /// uma violação estrutural que aborta o lote.
    pub fn validate(&self) -> Result<(), TnError> {
        let expected = self.example_ids.len();
        for (field, found) in [
            ("tags", self.tags.len()),
            ("tokens", self.tokens.len()),
            ("valid_lengths", self.valid_lengths.len()),
        ] {
            if found != expected {
                return Err(TnError::RaggedBatch { field, expected, found });
            }
        }
        Ok(())
    }
}
