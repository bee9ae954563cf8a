//! Servidor web Axum de demonstração: recebe lotes etiquetados em JSON e
//! devolve o texto reconstruído por exemplo, usando os colaboradores de
//! demonstração (detokenizador por tabela e reescritor por dicionário) no
//! lugar dos modelos neurais.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tn_core::fixtures::{
    demo_batch, demo_markers, demo_rewrites, demo_vocab, LookupRewriter, VocabDetokenizer,
};
use tn_core::{ExampleId, ResultAccumulator, Tag, TaggedBatch, TnPipeline, TokenId};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: TnPipeline<VocabDetokenizer, LookupRewriter>,
}

/// Lote recebido do cliente, com tags como índices numéricos do tagger
#[derive(Deserialize)]
struct NormalizeRequest {
    tags: Vec<Vec<usize>>,
    tokens: Vec<Vec<TokenId>>,
    valid_lengths: Vec<usize>,
    example_ids: Vec<ExampleId>,
}

#[derive(Serialize)]
struct ExampleResult {
    example_id: ExampleId,
    fragments: Vec<String>,
    text: String,
}

#[derive(Serialize)]
struct NormalizeResponse {
    results: Vec<ExampleResult>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let pipeline = TnPipeline::new(
        VocabDetokenizer::new(demo_vocab()),
        LookupRewriter::new(demo_rewrites(), VocabDetokenizer::new(demo_vocab())),
        demo_markers(),
    );
    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/normalize", post(normalize_handler))
        .route("/demo-batch", get(demo_batch_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Servidor de normalização iniciado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

/// Descrição mínima da API
async fn index_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "tn-web",
        "endpoints": {
            "POST /normalize": "lote etiquetado (tags numéricas) → texto por exemplo",
            "GET /demo-batch": "lote de demonstração pronto para enviar ao /normalize",
        }
    }))
}

/// Lote de demonstração, já no formato aceito por `/normalize`
async fn demo_batch_handler() -> impl IntoResponse {
    let batch = demo_batch();
    let tags: Vec<Vec<usize>> = batch
        .tags
        .iter()
        .map(|row| row.iter().map(|t| t.index()).collect())
        .collect();
    Json(serde_json::json!({
        "tags": tags,
        "tokens": batch.tokens,
        "valid_lengths": batch.valid_lengths,
        "example_ids": batch.example_ids,
    }))
}

/// Normalização via HTTP POST
async fn normalize_handler(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    Json(req): Json<NormalizeRequest>,
) -> impl IntoResponse {
    let batch = match decode_batch(req) {
        Ok(batch) => batch,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response();
        }
    };

    let example_ids = batch.example_ids.clone();
    let mut accumulator = ResultAccumulator::new();
    if let Err(err) = state.pipeline.process_batch(&batch, &mut accumulator) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response();
    }

    // Ordem da resposta segue a ordem das linhas; duplicatas aparecem uma vez
    let mut results = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for id in example_ids {
        if !seen.insert(id) {
            continue;
        }
        if let Some(fragments) = accumulator.get(id) {
            results.push(ExampleResult {
                example_id: id,
                fragments: fragments.to_vec(),
                text: fragments.join(" "),
            });
        }
    }

    Json(NormalizeResponse { results }).into_response()
}

/// Converte o lote do cliente (tags numéricas) para o tipo do pipeline
fn decode_batch(req: NormalizeRequest) -> Result<TaggedBatch, String> {
    let mut tags = Vec::with_capacity(req.tags.len());
    for (row, indices) in req.tags.iter().enumerate() {
        let mut decoded = Vec::with_capacity(indices.len());
        for &index in indices {
            let tag = Tag::from_index(index)
                .ok_or_else(|| format!("tag inválida {} na linha {}", index, row))?;
            decoded.push(tag);
        }
        tags.push(decoded);
    }
    Ok(TaggedBatch {
        tags,
        tokens: req.tokens,
        valid_lengths: req.valid_lengths,
        example_ids: req.example_ids,
    })
}
