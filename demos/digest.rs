//! Assembles a three-item digest: a headline for the first paragraph and a
//! context-aware transition before each following paragraph.
//!
//! Run with a folder of background articles:
//!
//! ```text
//! OPENAI_API_KEY=... cargo run --example digest -- ./documents
//! ```

use passerelle::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let docs = std::env::args().nth(1).unwrap_or_else(|| "documents".to_string());
    let config = Config::load_or_default();
    let provider = create_provider(&config.llm)?;

    let embedder = Embedder::new(Arc::clone(&provider), config.rag.embedding_model.clone());
    let kb = load_embeddings_from_documents(&docs, embedder).await?;
    println!("Indexed {} documents from {}", kb.len(), docs);

    let paragraphs = [
        "La ville de Rennes a inauguré mardi 12 mars sa nouvelle médiathèque.",
        "À Saint-Malo, les travaux du front de mer reprendront en avril.",
        "Le Stade rennais s'est imposé 2-0 face à Lorient samedi soir.",
    ];

    let examples = vec![
        Example::new(
            "La mairie rénove l'école Jules-Ferry.\nTRANSITION\nLe club de handball recrute.",
            "Côté sport,",
        ),
        Example::new(
            "Un marché de Noël s'installe place des Lices.\nTRANSITION\nLa gare sera fermée dimanche.",
            "Dans un autre registre,",
        ),
    ];

    let headline = HeadlineGenerator::from_config(Arc::clone(&provider), config.headline.clone())
        .generate(paragraphs[0])
        .await?;
    println!("{headline}\n");
    println!("{}", paragraphs[0]);

    let writer = TransitionGenerator::from_config(provider, config.transition.clone());
    let k = config.rag.top_k.min(kb.len());
    for pair in paragraphs.windows(2) {
        let context = kb.retrieve_context(pair[1], k).await?;
        let transition = writer
            .generate(pair[0], pair[1], &examples, Some(context.as_str()))
            .await?;
        println!("{transition} {}", pair[1]);
    }

    Ok(())
}
