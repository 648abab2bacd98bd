//! Star-point wallet and shop purchases. The wallet lives in the device store.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::shop::ShopItem;
use crate::models::roadmap::RoadmapItem;
use crate::persistence::device::{device_key, DeviceStore, DeviceStoreError};

pub mod handlers;

const WALLET_SLOT: &str = "wallet";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("unknown shop item '{0}'")]
    UnknownItem(String),

    #[error("not enough star points: have {have}, need {need}")]
    InsufficientPoints { have: u32, need: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Purchased,
    AlreadyOwned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Unsigned: a balance cannot go below zero.
    pub star_points: u32,
    pub inventory: Vec<String>,
    /// Roadmap ids that already paid out, so re-completing pays nothing.
    #[serde(default)]
    pub rewarded_items: Vec<String>,
}

impl Wallet {
    pub fn owns(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|id| id == item_id)
    }

    /// Owned items are a no-op; unaffordable items leave the wallet untouched.
    pub fn purchase(&mut self, item: &ShopItem) -> Result<PurchaseOutcome, PurchaseError> {
        if self.owns(item.id) {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }
        let remaining =
            self.star_points
                .checked_sub(item.cost)
                .ok_or(PurchaseError::InsufficientPoints {
                    have: self.star_points,
                    need: item.cost,
                })?;
        self.star_points = remaining;
        self.inventory.push(item.id.to_string());
        Ok(PurchaseOutcome::Purchased)
    }

    /// Pays `reward` the first time `item_id` completes. Returns whether it paid.
    pub fn credit_completion(&mut self, item_id: &str, reward: u32) -> bool {
        if self.rewarded_items.iter().any(|id| id == item_id) {
            return false;
        }
        self.rewarded_items.push(item_id.to_string());
        self.star_points = self.star_points.saturating_add(reward);
        true
    }
}

pub async fn load_wallet(
    device: &dyn DeviceStore,
    username_key: &str,
) -> Result<Wallet, DeviceStoreError> {
    Ok(device
        .get_json(&device_key(username_key, WALLET_SLOT))
        .await?
        .unwrap_or_default())
}

pub async fn save_wallet(
    device: &dyn DeviceStore,
    username_key: &str,
    wallet: &Wallet,
) -> Result<(), DeviceStoreError> {
    device
        .set_json(&device_key(username_key, WALLET_SLOT), wallet, None)
        .await
}

/// Best-effort star-point payout for a newly completed roadmap item.
pub async fn reward_completion(device: &dyn DeviceStore, username_key: &str, item: &RoadmapItem) {
    let mut wallet = match load_wallet(device, username_key).await {
        Ok(wallet) => wallet,
        Err(e) => {
            warn!("Skipping star-point reward for {username_key}: {e}");
            return;
        }
    };
    let reward = item.priority.completion_reward();
    if wallet.credit_completion(&item.id, reward) {
        info!("{username_key} earned {reward} star points for '{}'", item.id);
        device
            .remember(&device_key(username_key, WALLET_SLOT), &wallet, None)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::roadmap::roadmap_catalog;
    use crate::catalog::shop::{find_shop_item, SHOP_ITEMS};
    use crate::persistence::memory::MemoryDeviceStore;

    fn item() -> &'static ShopItem {
        find_shop_item("theme-midnight").unwrap()
    }

    #[test]
    fn test_unaffordable_purchase_changes_nothing() {
        let mut wallet = Wallet {
            star_points: item().cost - 1,
            ..Default::default()
        };
        let before = wallet.clone();
        let err = wallet.purchase(item()).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientPoints {
                have: item().cost - 1,
                need: item().cost
            }
        );
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_purchase_deducts_and_appends_once() {
        let mut wallet = Wallet {
            star_points: 200,
            ..Default::default()
        };
        assert_eq!(wallet.purchase(item()).unwrap(), PurchaseOutcome::Purchased);
        assert_eq!(wallet.star_points, 200 - item().cost);
        assert_eq!(wallet.inventory, vec![item().id.to_string()]);

        let after_first = wallet.clone();
        assert_eq!(wallet.purchase(item()).unwrap(), PurchaseOutcome::AlreadyOwned);
        assert_eq!(wallet, after_first);
    }

    #[test]
    fn test_exact_balance_is_affordable() {
        let mut wallet = Wallet {
            star_points: item().cost,
            ..Default::default()
        };
        wallet.purchase(item()).unwrap();
        assert_eq!(wallet.star_points, 0);
    }

    #[test]
    fn test_completion_pays_once_per_item() {
        let mut wallet = Wallet::default();
        assert!(wallet.credit_completion("y1-dsa-arrays", 30));
        assert!(!wallet.credit_completion("y1-dsa-arrays", 30));
        assert_eq!(wallet.star_points, 30);
    }

    #[test]
    fn test_shop_ids_are_unique() {
        let mut ids: Vec<_> = SHOP_ITEMS.iter().map(|i| i.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SHOP_ITEMS.len());
    }

    #[tokio::test]
    async fn test_reward_completion_persists_wallet() {
        let device: Arc<dyn DeviceStore> = Arc::new(MemoryDeviceStore::default());
        let item = roadmap_catalog().into_iter().next().unwrap();
        reward_completion(device.as_ref(), "bob", &item).await;
        reward_completion(device.as_ref(), "bob", &item).await;

        let wallet = load_wallet(device.as_ref(), "bob").await.unwrap();
        assert_eq!(wallet.star_points, item.priority.completion_reward());
        assert_eq!(wallet.rewarded_items, vec![item.id]);
    }
}
