use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::shop::{find_shop_item, ShopItem, SHOP_ITEMS};
use crate::errors::AppError;
use crate::shop::{load_wallet, save_wallet, PurchaseError, PurchaseOutcome, Wallet};
use crate::state::AppState;
use crate::workspace::handlers::workspace_for;

/// GET /api/v1/shop
pub async fn handle_list_items() -> Json<&'static [ShopItem]> {
    Json(SHOP_ITEMS)
}

/// GET /api/v1/users/:username/wallet
pub async fn handle_get_wallet(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Wallet>, AppError> {
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    Ok(Json(load_wallet(state.device.as_ref(), ws.username_key()).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub item_id: String,
}

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub outcome: PurchaseOutcome,
    pub wallet: Wallet,
}

/// POST /api/v1/users/:username/shop/purchase
pub async fn handle_purchase(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let item =
        find_shop_item(&req.item_id).ok_or_else(|| PurchaseError::UnknownItem(req.item_id.clone()))?;

    // The workspace lock serializes wallet read-modify-write per user.
    let workspace = workspace_for(&state, &username).await?;
    let ws = workspace.lock().await;
    let user = ws.username_key();

    let mut wallet = load_wallet(state.device.as_ref(), user).await?;
    let outcome = wallet.purchase(item)?;
    if outcome == PurchaseOutcome::Purchased {
        save_wallet(state.device.as_ref(), user, &wallet).await?;
        info!("{user} bought '{}' for {} star points", item.id, item.cost);
    }
    Ok(Json(PurchaseResponse { outcome, wallet }))
}
