//! # tn-core — Pós-processamento para Normalização Textual Neural
//!
//! Este crate implementa a camada determinística que fica entre dois
//! modelos neurais opacos — um **tagger contextual** (uma tag por token) e
//! um **reescritor de spans** (span + âncoras de contexto → string) — e
//! reconstrói um texto final por exemplo.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em duas varreduras da mesma sequência de tags, por lote:
//!
//! 1. **Entrada**: lote de previsões do tagger ([`TaggedBatch`]): tags,
//!    ids de token, comprimentos válidos e ids de exemplo.
//! 2. **Extração** ([`extract`]): a primeira varredura descobre os spans a
//!    reescrever e deriva as âncoras exatas para o reescritor, na ordem
//!    global esquerda→direita (linha 0, linha 1, …).
//! 3. **Reescrita**: o reescritor externo é invocado uma única vez por
//!    lote, com a lista inteira de pedidos; a resposta `k` responde ao
//!    pedido `k`.
//! 4. **Montagem** ([`assemble`]): a segunda varredura alterna trechos
//!    verbatim (detokenizados) e trechos reescritos, consumindo as
//!    respostas na ordem em que foram pedidas (cursor compartilhado).
//! 5. **Saída**: [`ResultAccumulator`] — `id do exemplo → fragmentos`,
//!    acumulado através de todos os lotes de um passe, primeiro a
//!    escrever vence.
//!
//! O ponto delicado é que as duas varreduras precisam enxergar exatamente
//! as mesmas fronteiras de span: qualquer divergência desalinha o cursor e
//! corrompe o texto em silêncio. Por isso a regra de fronteira vive em uma
//! única função ([`span::scan_spans`]) usada pelas duas.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use tn_core::fixtures::{
//!     demo_batch, demo_markers, demo_rewrites, demo_vocab, LookupRewriter, VocabDetokenizer,
//! };
//! use tn_core::{ResultAccumulator, TnPipeline};
//!
//! // 1. Instancia o pipeline com os colaboradores (aqui, os de demonstração)
//! let pipeline = TnPipeline::new(
//!     VocabDetokenizer::new(demo_vocab()),
//!     LookupRewriter::new(demo_rewrites(), VocabDetokenizer::new(demo_vocab())),
//!     demo_markers(),
//! );
//!
//! // 2. Acumulador com escopo de um passe
//! let mut results = ResultAccumulator::new();
//!
//! // 3. Processa os lotes
//! pipeline.process_batch(&demo_batch(), &mut results)?;
//!
//! // 4. Texto final por exemplo
//! assert_eq!(results.joined(0).as_deref(), Some("the fifty five dogs"));
//! # Ok::<(), tn_core::TnError>(())
//! ```
//!
//! ## Fora de Escopo
//!
//! Os modelos neurais (tagging e seq2seq), a tokenização, o carregamento de
//! dados e a orquestração de treino/avaliação são colaboradores externos,
//! consumidos pelos traits [`Detokenizer`] e [`SpanRewriter`]. Também não
//! há caminho gramatical/baseado em regras nem cálculo de acurácia aqui.

pub mod assemble;
pub mod batch;
pub mod error;
pub mod extract;
pub mod fixtures;
pub mod pipeline;
pub mod results;
pub mod span;
pub mod tag;

/// Id de token (espaço de vocabulário dos tokenizadores externos)
pub type TokenId = i64;
/// Id opaco de exemplo, estável entre lotes
pub type ExampleId = u64;

pub use assemble::{assemble_example, Detokenizer};
pub use batch::{SequenceMarkers, TaggedBatch};
pub use error::TnError;
pub use extract::{extract_requests, RewriteRequest};
pub use pipeline::{SpanRewriter, TnPipeline};
pub use results::ResultAccumulator;
pub use span::{scan_spans, Span};
pub use tag::{SpanCategory, Tag};
