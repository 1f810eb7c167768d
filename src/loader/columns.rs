//! Column headers of the "Paychex Data" sheet.

/// "Job Name".
pub const JOB_NAME: &str = "Job Name";
/// "Primary Org Unit".
pub const PRIMARY_ORG_UNIT: &str = "Primary Org Unit";
/// "Check Date".
pub const CHECK_DATE: &str = "Check Date";
/// "Last Name and Suffix".
pub const LAST_NAME_AND_SUFFIX: &str = "Last Name and Suffix";
/// "Withholding-Deduction Name".
pub const WITHHOLDING_DEDUCTION_NAME: &str = "Withholding-Deduction Name";
/// "Withholding-Deduction Amt".
pub const WITHHOLDING_DEDUCTION_AMT: &str = "Withholding-Deduction Amt";
/// "Earning Amount".
pub const EARNING_AMOUNT: &str = "Earning Amount";
/// "Reimbursement-Other Payment Amount".
pub const REIMBURSEMENT_AMOUNT: &str = "Reimbursement-Other Payment Amount";
/// "Combined Company and Employee Tax Amount".
pub const COMBINED_TAX: &str = "Combined Company and Employee Tax Amount";

/// Every column the loader reads. Other columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    JOB_NAME,
    PRIMARY_ORG_UNIT,
    CHECK_DATE,
    LAST_NAME_AND_SUFFIX,
    WITHHOLDING_DEDUCTION_NAME,
    WITHHOLDING_DEDUCTION_AMT,
    EARNING_AMOUNT,
    REIMBURSEMENT_AMOUNT,
    COMBINED_TAX,
];
