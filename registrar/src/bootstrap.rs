//! The Registration Authority's one-shot startup bootstrap (§4.2): publish
//! group parameters to BB and ensure the local key-value store directory
//! exists.

use cryptocore::group::GroupParameters;

use crate::state::AppState;

pub async fn run(state: &AppState) -> anyhow::Result<()> {
    std::fs::create_dir_all(state.config.data_dir.join("keys"))?;
    std::fs::create_dir_all(state.config.data_dir.join("elections"))?;

    let group = GroupParameters::standard();
    *state.group.write().await = Some(group.clone());

    let url = format!("{}/receive-params", state.config.bb_api_url);
    state.http.post(&url).json(&group).send().await?.error_for_status()?;
    tracing::info!(%url, "published group parameters to bulletin board");
    Ok(())
}
