//! Ordered alias lists mapping the sheet's inconsistent column names onto
//! canonical fields. Resolution is first-match-wins with exact,
//! case-sensitive header comparison; extend a list at the end to keep
//! existing sheets resolving the same way.

pub const IDENTITY: &[&str] = &["Name", "Clinic", "Provider", "Location", "Site"];

pub const WAIT_DAYS: &[&str] = &[
    "Days Out",
    "Wait Days",
    "Wait (Days)",
    "Days Until Available",
    "Wait Time (Days)",
    "Wait",
];

pub const SCORE: &[&str] = &["Score", "Quality Score", "Rating", "Overall Score"];

pub const CAPTURED_AT: &[&str] = &[
    "Captured At",
    "Last Updated",
    "Updated",
    "Timestamp",
    "Date Checked",
    "Date",
];

pub const ERROR_CODE: &[&str] = &["Error Code", "Error", "Status Code"];

pub const ERROR_DETAILS: &[&str] = &["Error Details", "Error Message", "Error Notes", "Details"];

pub const CATEGORY: &[&str] = &["Category", "Type", "Service"];

pub const URL: &[&str] = &["URL", "Website", "Link"];
