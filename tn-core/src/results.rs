//! # Acumulador de Resultados
//!
//! Mapa `id do exemplo → fragmentos de texto`, com escopo de **um passe**
//! de inferência/avaliação e acumulado através de todos os lotes.
//!
//! A regra de duplicatas é *primeiro a escrever vence*: um id que reaparece
//! em um lote posterior (ex: lote final curto repetindo exemplos) é
//! ignorado por inteiro — nem mesclado, nem sobrescrito. As duas varreduras
//! do pipeline consultam o acumulador com a mesma regra, de modo que um
//! exemplo pulado não consome respostas do reescritor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ExampleId;

/// Acumulador de fragmentos por exemplo, com semântica primeiro-vence.
///
/// Substitui um dicionário global mutável: o dono do passe cria o
/// acumulador, passa-o a cada chamada de lote e o descarta ao final.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResultAccumulator {
    results: HashMap<ExampleId, Vec<String>>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indica se o exemplo já foi montado em algum lote anterior.
    pub fn contains(&self, example_id: ExampleId) -> bool {
        self.results.contains_key(&example_id)
    }

    /// Registra os fragmentos de um exemplo.
    ///
    /// Retorna `true` se o exemplo foi inserido; `false` se o id já existia
    /// (a inserção é ignorada por inteiro, primeiro a escrever vence).
    pub fn insert(&mut self, example_id: ExampleId, fragments: Vec<String>) -> bool {
        if self.results.contains_key(&example_id) {
            return false;
        }
        self.results.insert(example_id, fragments);
        true
    }

    /// Fragmentos de um exemplo, na ordem final esquerda→direita.
    pub fn get(&self, example_id: ExampleId) -> Option<&[String]> {
        self.results.get(&example_id).map(|v| v.as_slice())
    }

    /// Texto final de um exemplo: fragmentos unidos por espaço.
    ///
    /// Conveniência para consumidores simples (servidor de demonstração);
    /// avaliadores que exigem outra política de junção devem usar [`get`].
    ///
    /// [`get`]: ResultAccumulator::get
    pub fn joined(&self, example_id: ExampleId) -> Option<String> {
        self.results.get(&example_id).map(|f| f.join(" "))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExampleId, &[String])> + '_ {
        self.results.iter().map(|(id, f)| (*id, f.as_slice()))
    }

    /// Consome o acumulador e devolve o mapa bruto (fim do passe).
    pub fn into_map(self) -> HashMap<ExampleId, Vec<String>> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let mut acc = ResultAccumulator::new();
        assert!(acc.insert(7, vec!["a".into(), "b".into()]));
        assert!(!acc.insert(7, vec!["x".into()]));
        assert_eq!(acc.get(7), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_joined() {
        let mut acc = ResultAccumulator::new();
        acc.insert(1, vec!["the".into(), "five".into(), "dogs".into()]);
        assert_eq!(acc.joined(1).as_deref(), Some("the five dogs"));
        assert_eq!(acc.joined(2), None);
    }

    #[test]
    fn test_empty_fragments_allowed() {
        // Exemplo sem tokens válidos: lista vazia é um resultado legítimo
        let mut acc = ResultAccumulator::new();
        assert!(acc.insert(3, vec![]));
        assert!(acc.contains(3));
        assert_eq!(acc.get(3), Some(&[][..]));
    }
}
