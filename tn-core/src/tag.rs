//! # Alfabeto de Tags Semióticas
//!
//! Define o esquema de anotação de **4 tags** usado pelo tagger contextual
//! para marcar, token a token, o que deve ser copiado e o que deve ser
//! reescrito pelo modelo seq2seq.
//!
//! | Tag               | Id | Significado                                        |
//! |-------------------|----|----------------------------------------------------|
//! | `OuterStart`      | 0  | Início de um trecho literal (copiado)              |
//! | `OuterContinue`   | 1  | Continuação de um trecho literal                   |
//! | `RewriteStart`    | 2  | Início de um trecho semiótico (reescrito)          |
//! | `RewriteContinue` | 3  | Continuação de um trecho semiótico                 |
//!
//! ## Categorias
//!
//! Para a reconstrução do texto, só importa a **categoria** de cada tag:
//! `Outer` (verbatim) ou `Rewrite` (semiótica). As duas varreduras do
//! pós-processamento ([`crate::extract`] e [`crate::assemble`]) decidem
//! fronteiras de span exclusivamente pela categoria — uma tag de
//! continuação da categoria oposta fecha o span aberto e abre outro.

use serde::{Deserialize, Serialize};

/// Categoria derivada de uma tag: decide se o trecho é copiado ou reescrito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanCategory {
    /// **Verbatim**: o trecho é detokenizado e copiado sem alteração.
    Outer,
    /// **Semiótica**: o trecho é substituído pela saída do reescritor.
    Rewrite,
}

impl SpanCategory {
    /// Nome curto da categoria (para logs e serialização legível)
    pub fn name(&self) -> &'static str {
        match self {
            SpanCategory::Outer => "outer",
            SpanCategory::Rewrite => "rewrite",
        }
    }
}

/// Tag prevista pelo tagger contextual para um token.
///
/// O tagger emite o argmax dos logits como um índice `0..=3`; use
/// [`Tag::from_index`] para converter. Em modos supervisionados a mesma
/// representação serve para o ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Início de trecho literal
    OuterStart,
    /// Continuação de trecho literal
    OuterContinue,
    /// Início de trecho a reescrever
    RewriteStart,
    /// Continuação de trecho a reescrever
    RewriteContinue,
}

impl Tag {
    /// Número total de tags possíveis
    pub const COUNT: usize = 4;

    /// Índice numérico da tag, igual ao espaço de classes do tagger.
    pub fn index(&self) -> usize {
        match self {
            Tag::OuterStart => 0,
            Tag::OuterContinue => 1,
            Tag::RewriteStart => 2,
            Tag::RewriteContinue => 3,
        }
    }

    /// Converte o índice emitido pelo tagger de volta para a tag.
    ///
    /// Retorna `None` para índices fora de `0..=3` (logits malformados).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Tag::OuterStart),
            1 => Some(Tag::OuterContinue),
            2 => Some(Tag::RewriteStart),
            3 => Some(Tag::RewriteContinue),
            _ => None,
        }
    }

    /// Todas as tags em ordem de índice (para iteração)
    pub fn all() -> [Tag; 4] {
        [
            Tag::OuterStart,
            Tag::OuterContinue,
            Tag::RewriteStart,
            Tag::RewriteContinue,
        ]
    }

    /// Categoria da tag. Total: toda tag pertence a exatamente uma categoria.
    pub fn category(&self) -> SpanCategory {
        match self {
            Tag::OuterStart | Tag::OuterContinue => SpanCategory::Outer,
            Tag::RewriteStart | Tag::RewriteContinue => SpanCategory::Rewrite,
        }
    }

    /// Indica se a tag é de continuação (`*Continue`).
    ///
    /// Observação: a continuação só é honrada quando a categoria coincide
    /// com a do span aberto — ver [`crate::span::scan_spans`].
    pub fn is_continuation(&self) -> bool {
        matches!(self, Tag::OuterContinue | Tag::RewriteContinue)
    }

    /// Representação textual da tag (ex: "O-I", "B-M")
    pub fn label(&self) -> &'static str {
        match self {
            Tag::OuterStart => "O-I",
            Tag::OuterContinue => "O-M",
            Tag::RewriteStart => "B-I",
            Tag::RewriteContinue => "B-M",
        }
    }

    /// Parseia uma tag a partir do rótulo textual (ex: "B-I" → `RewriteStart`)
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "O-I" => Some(Tag::OuterStart),
            "O-M" => Some(Tag::OuterContinue),
            "B-I" => Some(Tag::RewriteStart),
            "B-M" => Some(Tag::RewriteContinue),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
