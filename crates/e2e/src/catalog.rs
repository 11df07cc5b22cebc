//! The static suite catalog
//!
//! Every suite is a YAML document compiled into the binary and paired with a
//! display name and a module id. Order here is execution and report order.

use crate::error::{E2eError, E2eResult};
use crate::runner::SuiteEntry;
use crate::suite::{Suite, SuiteContext};

macro_rules! scenario_factory {
    ($fn_name:ident, $file:literal) => {
        fn $fn_name(ctx: &SuiteContext<'_>) -> E2eResult<Suite> {
            Suite::from_scenario(ctx, include_str!(concat!("../suites/", $file)))
        }
    };
}

scenario_factory!(registration, "registration.yaml");
scenario_factory!(login, "login.yaml");
scenario_factory!(open_account, "open_account.yaml");
scenario_factory!(transfer_funds, "transfer_funds.yaml");
scenario_factory!(accounts_overview, "accounts_overview.yaml");
scenario_factory!(admin, "admin.yaml");
scenario_factory!(customer_care, "customer_care.yaml");
scenario_factory!(billpay, "billpay.yaml");
scenario_factory!(find_transactions, "find_transactions.yaml");
scenario_factory!(request_loan, "request_loan.yaml");
scenario_factory!(account_activity, "account_activity.yaml");

/// All suites, in run order
pub static CATALOG: &[SuiteEntry] = &[
    SuiteEntry::new("Registration", "registration", registration),
    SuiteEntry::new("Login", "login", login),
    SuiteEntry::new("Open Account", "open_account", open_account),
    SuiteEntry::new("Transfer Funds", "transfer_funds", transfer_funds),
    SuiteEntry::new("Accounts Overview", "accounts_overview", accounts_overview),
    SuiteEntry::new("Admin Page", "admin", admin),
    SuiteEntry::new("Customer Care", "customer_care", customer_care),
    SuiteEntry::new("Bill Pay", "billpay", billpay),
    SuiteEntry::new("Find Transactions", "find_transactions", find_transactions),
    SuiteEntry::new("Request Loan", "request_loan", request_loan),
    SuiteEntry::new("Account Activity", "account_activity", account_activity),
];

/// Look up one entry by module id
pub fn find(module_id: &str) -> Option<&'static SuiteEntry> {
    CATALOG.iter().find(|e| e.module_id == module_id)
}

/// Entries whose module id is in `module_ids`, in catalog order.
///
/// An empty filter selects everything; an unknown id is an error.
pub fn select(module_ids: &[String]) -> E2eResult<Vec<SuiteEntry>> {
    if let Some(unknown) = module_ids.iter().find(|id| find(id).is_none()) {
        let known: Vec<_> = CATALOG.iter().map(|e| e.module_id).collect();
        return Err(E2eError::Config(format!(
            "unknown suite '{}' (known: {})",
            unknown,
            known.join(", ")
        )));
    }

    Ok(CATALOG
        .iter()
        .filter(|e| module_ids.is_empty() || module_ids.iter().any(|id| id == e.module_id))
        .copied()
        .collect())
}
