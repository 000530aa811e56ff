// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::nodeset::NodeSetServiceManager;
use crate::wallet::NodeWallet;

#[derive(Clone)]
pub struct AppState {
    pub nodeset: Arc<NodeSetServiceManager>,
}

impl AppState {
    pub fn new(nodeset: Arc<NodeSetServiceManager>) -> Self {
        Self { nodeset }
    }

    pub fn wallet(&self) -> &Arc<NodeWallet> {
        self.nodeset.wallet()
    }
}
