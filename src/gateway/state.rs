//! Shared gateway state.

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::credit_card::CardService;
use crate::money::Amount;
use crate::pix::{PixDirectory, PixQrService};
use crate::store::{Ledger, postgres::PgLedger};
use crate::transfer::TransferService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ledger: Arc<dyn Ledger>,
    pub auth: AuthService,
    pub transfers: TransferService,
    pub pix_directory: PixDirectory,
    pub pix_qr: PixQrService,
    pub cards: CardService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let starter_balance = Amount::parse(&config.starter_balance)
            .expect("starter_balance must be a valid 2-decimal amount");

        let ledger: Arc<dyn Ledger> = Arc::new(PgLedger::new(pool.clone()));
        let auth = AuthService::new(pool.clone(), config.jwt_secret.clone(), starter_balance);
        let transfers = TransferService::new(ledger.clone());
        let pix_directory = PixDirectory::new(pool.clone());
        let pix_qr = PixQrService::new(pool.clone(), ledger.clone());
        let cards = CardService::new(pool.clone(), ledger.clone());

        Self {
            pool,
            ledger,
            auth,
            transfers,
            pix_directory,
            pix_qr,
            cards,
        }
    }
}
