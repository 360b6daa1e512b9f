//! Short link redirects (mounted outside `/api`).

use axum::{
    extract::State,
    response::Redirect,
    routing::get,
    Router,
};

use crate::{error::Result, AppState};

use super::extract::PathParam;

pub fn routes() -> Router<AppState> {
    Router::new().route("/s/:code", get(follow_short_link))
}

async fn follow_short_link(
    State(state): State<AppState>,
    PathParam(code): PathParam<String>,
) -> Result<Redirect> {
    let destination = state.short_links.redirect(&code).await?;
    Ok(Redirect::temporary(&destination))
}
