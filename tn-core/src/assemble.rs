//! # Montagem do Texto Final (segunda varredura)
//!
//! Percorre a mesma sequência de tags com a regra compartilhada de
//! [`crate::span::scan_spans`] e emite um fragmento de texto por span:
//! spans `Outer` são detokenizados verbatim; spans `Rewrite` consomem a
//! próxima resposta do reescritor através do **cursor compartilhado**.
//!
//! O cursor é um índice na lista de respostas do lote inteiro e avança uma
//! posição por span `Rewrite` consumido. Ele nunca é reiniciado entre
//! exemplos: é esse encadeamento que mantém o consumo alinhado com a ordem
//! em que [`crate::extract`] produziu os pedidos, desde que as duas
//! varreduras visitem os exemplos na mesma ordem fixa de linha.

use crate::batch::SequenceMarkers;
use crate::error::TnError;
use crate::span::scan_spans;
use crate::tag::{SpanCategory, Tag};
use crate::TokenId;

/// Detokenizador externo (colaborador fora de escopo).
///
/// Função pura: recebe uma subsequência de ids e devolve texto. Deve
/// aceitar entrada vazia e devolver string vazia.
pub trait Detokenizer {
    fn ids_to_text(&self, ids: &[TokenId]) -> String;
}

/// Monta a lista de fragmentos de um exemplo.
///
/// `rewritten` é a lista de respostas do reescritor para o **lote**;
/// `cursor` é o índice compartilhado entre todos os exemplos do lote e é
/// avançado aqui a cada span `Rewrite`. Ler além de `rewritten` é uma
/// violação estrutural ([`TnError::RewriteUnderrun`]): indica lote
/// desalinhado vindo do colaborador, nunca truncar a saída em silêncio.
///
/// Um exemplo sem tokens válidos (`valid_length <= 1`) devolve lista vazia.
/// A concatenação dos fragmentos na ordem devolvida é o texto final; a
/// política de junção fica com o consumidor externo.
pub fn assemble_example<D: Detokenizer + ?Sized>(
    tags: &[Tag],
    tokens: &[TokenId],
    valid_length: usize,
    markers: &SequenceMarkers,
    rewritten: &[String],
    cursor: &mut usize,
    detokenizer: &D,
) -> Result<Vec<String>, TnError> {
    let spans = scan_spans(tags, tokens, valid_length, markers.eos_id);
    let mut fragments = Vec::with_capacity(spans.len());

    for span in spans {
        match span.category {
            SpanCategory::Outer => {
                fragments.push(detokenizer.ids_to_text(&tokens[span.start..span.end]));
            }
            SpanCategory::Rewrite => {
                let text = rewritten.get(*cursor).ok_or(TnError::RewriteUnderrun {
                    needed: *cursor + 1,
                    provided: rewritten.len(),
                })?;
                fragments.push(text.clone());
                *cursor += 1;
            }
        }
    }

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOS: TokenId = 1;
    const EOS: TokenId = 2;

    fn markers() -> SequenceMarkers {
        SequenceMarkers::new(BOS, EOS)
    }

    fn tags(labels: &[&str]) -> Vec<Tag> {
        labels.iter().map(|l| Tag::from_label(l).unwrap()).collect()
    }

    /// Detokenizador de teste: cada id conhecido vira uma palavra fixa.
    struct TestDetok;

    impl Detokenizer for TestDetok {
        fn ids_to_text(&self, ids: &[TokenId]) -> String {
            ids.iter()
                .map(|id| match id {
                    10 => "the",
                    20 => "5",
                    30 => "dogs",
                    _ => "?",
                })
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    #[test]
    fn test_boundary_example_fragments() {
        let t = tags(&["O-I", "O-I", "B-I", "B-M", "O-I", "O-I"]);
        let tokens = vec![BOS, 10, 20, 20, 30, EOS];
        let rewritten = vec!["five".to_string()];
        let mut cursor = 0;
        let fragments = assemble_example(
            &t, &tokens, 6, &markers(), &rewritten, &mut cursor, &TestDetok,
        )
        .unwrap();
        assert_eq!(fragments, vec!["the", "five", "dogs"]);
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_all_outer_without_rewriter() {
        // Fallback todo-verbatim: lista de respostas vazia, cursor parado
        let t = tags(&["O-I", "O-I", "O-M", "O-I"]);
        let tokens = vec![BOS, 10, 30, EOS];
        let mut cursor = 0;
        let fragments =
            assemble_example(&t, &tokens, 4, &markers(), &[], &mut cursor, &TestDetok).unwrap();
        assert_eq!(fragments, vec!["the dogs"]);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn test_underrun_is_fatal() {
        let t = tags(&["O-I", "B-I", "O-I", "B-I", "O-I"]);
        let tokens = vec![BOS, 20, 10, 20, EOS];
        let rewritten = vec!["five".to_string()]; // faltam respostas
        let mut cursor = 0;
        let err = assemble_example(
            &t, &tokens, 5, &markers(), &rewritten, &mut cursor, &TestDetok,
        )
        .unwrap_err();
        assert_eq!(err, TnError::RewriteUnderrun { needed: 2, provided: 1 });
    }

    #[test]
    fn test_empty_example() {
        let t = tags(&["O-I"]);
        let tokens = vec![BOS];
        let mut cursor = 0;
        let fragments =
            assemble_example(&t, &tokens, 1, &markers(), &[], &mut cursor, &TestDetok).unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_cursor_is_shared_across_examples() {
        // Dois exemplos montados em sequência consomem respostas em ordem
        let t = tags(&["O-I", "B-I", "O-I"]);
        let tokens_a = vec![BOS, 20, EOS];
        let tokens_b = vec![BOS, 20, EOS];
        let rewritten = vec!["five".to_string(), "six".to_string()];
        let mut cursor = 0;
        let a = assemble_example(
            &t, &tokens_a, 3, &markers(), &rewritten, &mut cursor, &TestDetok,
        )
        .unwrap();
        let b = assemble_example(
            &t, &tokens_b, 3, &markers(), &rewritten, &mut cursor, &TestDetok,
        )
        .unwrap();
        assert_eq!(a, vec!["five"]);
        assert_eq!(b, vec!["six"]);
        assert_eq!(cursor, 2);
    }
}
