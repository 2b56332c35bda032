//! Bounded concurrent modinfo queries.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::modinfo::ModuleQuery;

/// Query every module once, with at most `jobs` queries in flight.
///
/// Duplicate names are queried once. The returned map only holds modules the
/// tool answered for; rejected or timed-out modules are absent. The first
/// hard error aborts the remaining queries.
pub async fn describe_all<Q, I>(
    query: Arc<Q>,
    modules: I,
    field: Option<&'static str>,
    jobs: usize,
) -> Result<BTreeMap<String, String>>
where
    Q: ModuleQuery,
    I: IntoIterator<Item = String>,
{
    let unique: BTreeSet<String> = modules.into_iter().collect();
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for module in unique {
        let query = Arc::clone(&query);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .context("Query pool closed")?;
            let output = query.describe(&module, field).await?;
            Ok::<_, anyhow::Error>((module, output))
        });
    }

    let mut described = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (module, output) = joined.context("modinfo worker panicked")??;
        if let Some(output) = output {
            described.insert(module, output);
        }
    }

    Ok(described)
}
