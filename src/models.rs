use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Structured result of parsing one chat message. Serializes to the
/// `{"type": ..., "data": ...}` wire shape consumed by reply handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ParseResult {
    Accounting(AccountingPayload),
    Reminder(ReminderPayload),
    Query(QueryPayload),
    AccountCommand(AccountCommandPayload),
    Conversation(ConversationPayload),
}

impl ParseResult {
    /// Conversation fallback carrying a guidance message. Always producible.
    pub fn conversation(message: impl Into<String>) -> Self {
        Self::Conversation(ConversationPayload {
            message: message.into(),
            keywords: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }
}

/// One bookkeeping entry. `amount` is a non-negative magnitude; the sign
/// lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingPayload {
    pub item: String,
    pub amount: f64,
    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub account: Option<String>,
    pub date: NaiveDate,
}

/// Recurrence rule for a reminder. Weekly carries Monday=0 … Sunday=6,
/// monthly carries the day of month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repeat_type", content = "repeat_value", rename_all = "snake_case")]
pub enum RepeatRule {
    None,
    Daily,
    Weekly(u32),
    Monthly(u32),
}

impl RepeatRule {
    pub fn as_db(&self) -> (&'static str, Option<i64>) {
        match self {
            Self::None => ("none", None),
            Self::Daily => ("daily", None),
            Self::Weekly(w) => ("weekly", Some(*w as i64)),
            Self::Monthly(d) => ("monthly", Some(*d as i64)),
        }
    }

    pub fn from_db(kind: &str, value: Option<i64>) -> Self {
        match kind {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly(value.unwrap_or(0) as u32),
            "monthly" => Self::Monthly(value.unwrap_or(1) as u32),
            _ => Self::None,
        }
    }

    /// Human description for confirmation replies, None when not repeating.
    pub fn describe(&self) -> Option<String> {
        const WEEKDAYS: [&str; 7] = [
            "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
        ];
        match self {
            Self::None => None,
            Self::Daily => Some("每天重複".to_string()),
            Self::Weekly(w) => Some(format!("每週{}重複", WEEKDAYS[(*w as usize).min(6)])),
            Self::Monthly(d) => Some(format!("每月{d}日重複")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub content: String,
    pub due: NaiveDateTime,
    /// Minutes of lead time before `due` at which the notification fires.
    pub remind_before: u32,
    #[serde(flatten)]
    pub repeat: RepeatRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Expense,
    Income,
    Reminder,
    Balance,
    Overview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

/// Which instance of the range: the current one, the previous one, or an
/// explicit "YYYY-MM" / "YYYY-MM-DD" value. Serializes as a bare string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeValue {
    Current,
    Previous,
    Explicit(String),
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let s = match self {
            Self::Current => "current",
            Self::Previous => "previous",
            Self::Explicit(v) => v.as_str(),
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "current" => Self::Current,
            "previous" => Self::Previous,
            _ => Self::Explicit(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub query_type: QueryKind,
    pub time_range: TimeRange,
    pub time_value: TimeValue,
    pub category: Option<String>,
    pub account: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountAction {
    AddAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCommandPayload {
    pub action: AccountAction,
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub message: String,
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Persistent rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: f64,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: i64,
    pub content: String,
    pub due: NaiveDateTime,
    pub remind_before: u32,
    pub repeat: RepeatRule,
    pub is_done: bool,
}
