/// Paginated ERC-20 transfer history for one account
use crate::apis::etherscan::TokenTransfer;
use crate::apis::EtherscanClient;
use crate::logger::LogTag;
use crate::types::Address;

pub const DEFAULT_END_BLOCK: u64 = 99_999_999;
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters for `account/tokentx`
#[derive(Debug, Clone)]
pub struct TransferQuery {
    pub address: Address,
    /// Restrict to one token contract
    pub contract: Option<Address>,
    pub start_block: u64,
    pub end_block: u64,
    pub page_size: u32,
    pub max_transfers: Option<usize>,
    pub sort: SortOrder,
}

impl TransferQuery {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            contract: None,
            start_block: 0,
            end_block: DEFAULT_END_BLOCK,
            page_size: DEFAULT_PAGE_SIZE,
            max_transfers: None,
            sort: SortOrder::Desc,
        }
    }

    pub fn with_contract(mut self, contract: Address) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_transfers(mut self, max: Option<usize>) -> Self {
        self.max_transfers = max;
        self
    }
}

/// Transfers in provider order
#[derive(Debug, Clone, Default)]
pub struct TransferHistory {
    pub transfers: Vec<TokenTransfer>,
    pub pages: u32,
    /// False when an error cut the listing short
    pub complete: bool,
}

pub async fn fetch_all_transfers(client: &EtherscanClient, query: &TransferQuery) -> TransferHistory {
    let logger = client.logger();
    let page_size = query.page_size.max(1);
    let mut history = TransferHistory {
        complete: true,
        ..Default::default()
    };
    let mut page: u32 = 1;

    loop {
        let entries = match client.get_token_transfers_page(query, page).await {
            Ok(entries) => entries,
            Err(err) => {
                logger.warning(
                    LogTag::Transfers,
                    &format!(
                        "Transfer listing for {} stopped at page {}: {} (keeping {} transfers)",
                        query.address.short(),
                        page,
                        err,
                        history.transfers.len()
                    ),
                );
                history.complete = false;
                break;
            }
        };
        history.pages += 1;

        let entries = match entries {
            Some(entries) if !entries.is_empty() => entries,
            _ => break,
        };
        let received = entries.len();

        for entry in entries {
            match serde_json::from_value::<TokenTransfer>(entry) {
                Ok(transfer) => history.transfers.push(transfer),
                Err(e) => logger.warning(
                    LogTag::Transfers,
                    &format!("Skipping malformed transfer entry: {}", e),
                ),
            }
        }

        logger.debug(
            LogTag::Transfers,
            &format!(
                "{} page {}: {} records, {} total",
                query.address.short(),
                page,
                received,
                history.transfers.len()
            ),
        );

        if let Some(max) = query.max_transfers {
            if history.transfers.len() >= max {
                history.transfers.truncate(max);
                break;
            }
        }

        if received < page_size as usize {
            break;
        }

        page += 1;
        tokio::time::sleep(client.page_delay()).await;
    }

    history
}
