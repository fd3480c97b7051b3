use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::datetime;
use super::INCOME_KEYWORDS;
use crate::models::{AccountingPayload, TransactionKind};

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

/// Scenario keywords used to label an entry when the residual item text is
/// empty, and as the first fallback for category inference.
const SCENARIO_ITEMS: &[(&str, &[&str])] = &[
    ("食品", &["超市", "大賣場", "菜市場", "買菜", "蔬菜", "水果", "肉類", "食品"]),
    ("餐飲", &["早餐", "午餐", "晚餐", "夜宵", "宵夜", "飯", "餐", "吃飯", "餐廳", "小吃", "飲料", "咖啡", "奶茶"]),
    ("交通", &["計程車", "出租車", "公車", "地鐵", "捷運", "高鐵", "火車", "機票", "油費", "加油", "停車費", "交通"]),
    ("購物", &["衣服", "鞋子", "包包", "電子產品", "家電", "購物", "商場", "百貨", "網購"]),
    ("娛樂", &["電影", "遊戲", "演唱會", "KTV", "唱歌", "酒吧", "娛樂"]),
    ("醫療", &["醫院", "診所", "醫生", "藥", "看病", "醫療"]),
    ("住宿", &["房租", "水電", "瓦斯", "電費", "水費", "住宿"]),
    ("通訊", &["手機費", "電話費", "網路費", "通訊"]),
    ("學習", &["書", "課程", "學費", "補習", "學習"]),
    ("寵物", &["寵物", "狗", "貓", "寵物用品", "寵物食品"]),
];

/// Expense category → trigger keywords, tested top to bottom.
pub(crate) const EXPENSE_CATEGORIES: &[(&str, &[&str])] = &[
    ("飲食", &["飯", "餐", "食", "吃", "喝", "飲料", "早餐", "午餐", "晚餐", "宵夜", "點心", "零食", "咖啡"]),
    ("交通", &["車", "票", "機票", "高鐵", "捷運", "公車", "計程車", "油費", "加油", "停車", "過路費", "uber", "ubike"]),
    ("購物", &["買", "購", "衣", "服", "鞋", "包", "電子", "3C", "家電", "傢俱", "裝飾", "日用品"]),
    ("娛樂", &["電影", "遊戲", "旅遊", "旅行", "玩", "唱歌", "KTV", "爬山", "運動", "健身", "展覽"]),
    ("醫療", &["醫", "藥", "看病", "掛號", "門診", "住院", "手術", "保健", "牙醫", "眼科", "檢查"]),
    ("教育", &["學", "書", "課", "班", "教材", "補習", "講義", "文具", "考試", "證照"]),
    ("居家", &["房租", "水費", "電費", "瓦斯費", "網路費", "管理費", "裝修", "清潔", "家具", "電話費"]),
];

/// Income category → trigger keywords.
pub(crate) const INCOME_CATEGORIES: &[(&str, &[&str])] = &[
    ("薪資", &["薪水", "薪資", "工資", "月薪", "週薪", "年薪", "加班費", "兼職"]),
    ("獎金", &["獎金", "分紅", "年終", "獎勵", "禮金", "紅包", "抽獎"]),
    ("投資", &["股", "投資", "基金", "股利", "利息", "租金", "理財", "定存", "股票", "債券", "配息"]),
    ("退款", &["退款", "退費", "賠償", "保險理賠", "報銷", "補貼", "退稅"]),
];

/// Known account types → keywords; matched case-insensitively so that
/// "line pay" and "Line Pay" both normalize to 電子支付.
const ACCOUNT_TYPES: &[(&str, &[&str])] = &[
    ("現金", &["現金", "錢包", "口袋", "cash"]),
    ("信用卡", &["信用卡", "visa", "master", "jcb", "刷卡"]),
    ("銀行", &["銀行", "轉帳", "atm", "金融卡", "存款"]),
    ("電子支付", &[
        "電子支付", "行動支付", "line pay", "街口", "悠遊付", "apple pay", "google pay",
        "支付寶", "微信支付", "pi拍錢包",
    ]),
];

// ---------------------------------------------------------------------------
// Amount patterns, most specific first
// ---------------------------------------------------------------------------

const UNIT: &str = r"(?:元|塊|圓|RMB|NT\$|NT)";

static SIGNED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-])\s*(\d+(?:\.\d+)?)").unwrap());
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

/// Ordered amount rules: first match wins. The second element forces the
/// transaction type when the phrasing itself implies it.
static AMOUNT_RULES: LazyLock<Vec<(Regex, Option<TransactionKind>)>> = LazyLock::new(|| {
    let rule = |pattern: String, forces| (Regex::new(&pattern).unwrap(), forces);
    vec![
        rule(
            format!(r"(?:花了|消費了|支付了|付了|用了)\s*(\d+(?:\.\d+)?)\s*{UNIT}?"),
            None,
        ),
        rule(format!(r"(\d+(?:\.\d+)?)\s*{UNIT}"), None),
        rule(
            format!(r"(?:賺了|收入|得到了|獲得了)\s*(\d+(?:\.\d+)?)\s*{UNIT}?"),
            Some(TransactionKind::Income),
        ),
        rule(format!(r"買了.*?(\d+(?:\.\d+)?)\s*{UNIT}?"), None),
        rule(format!(r"花費\s*(\d+(?:\.\d+)?)\s*{UNIT}?"), None),
        rule(format!(r"使用.*?支付\s*(\d+(?:\.\d+)?)\s*{UNIT}?"), None),
        rule(
            format!(r"(?:薪資|工資|薪水)\s*(\d+(?:\.\d+)?)\s*{UNIT}?"),
            Some(TransactionKind::Income),
        ),
    ]
});

static STRIP_VERB_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:花了|消費了|支付了|付了|用了|賺了|收入|得到了|獲得了|花費)\s*\d+(?:\.\d+)?\s*{UNIT}?"
    ))
    .unwrap()
});
static STRIP_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[+-]?\s*\d+(?:\.\d+)?\s*{UNIT}?")).unwrap());
static STRIP_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|<[^>]*>|@\S*").unwrap());

static CATEGORY_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());
static ACCOUNT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^>]*)>").unwrap());
static DATE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\S+)").unwrap());

static ACCOUNT_PHRASES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:使用|用|透過|經由|從)\s*([\w\s]+?)(?:帳戶|卡|支付)").unwrap(),
        Regex::new(r"(?:用|透過|使用)\s*([\w\s]+?)(?:付款|支付|付|刷|買)").unwrap(),
    ]
});

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Best-effort extraction of a bookkeeping entry. Never fails: missing
/// fields fall back to defaults (amount 0, category/account none, today).
pub fn extract(text: &str, today: NaiveDate) -> AccountingPayload {
    let mut kind = if INCOME_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };

    // Amount: explicit sign first (it also decides the type), then the
    // ordered rule table, then any bare number, then 0.
    let mut amount: f64 = 0.0;
    if let Some(caps) = SIGNED_AMOUNT.captures(text) {
        amount = caps[2].parse().unwrap_or(0.0);
        kind = match &caps[1] {
            "+" => TransactionKind::Income,
            _ => TransactionKind::Expense,
        };
    } else {
        let mut found = false;
        for (re, forces) in AMOUNT_RULES.iter() {
            if let Some(caps) = re.captures(text) {
                amount = caps[1].parse().unwrap_or(0.0);
                if let Some(forced) = forces {
                    kind = *forced;
                }
                found = true;
                break;
            }
        }
        if !found {
            if let Some(caps) = BARE_NUMBER.captures(text) {
                amount = caps[1].parse().unwrap_or(0.0);
            }
        }
    }

    // Item: the text minus amounts, markers and verb-amount phrases.
    let cleaned = STRIP_VERB_AMOUNT.replace_all(text, "");
    let cleaned = STRIP_AMOUNT.replace_all(&cleaned, "");
    let cleaned = STRIP_MARKERS.replace_all(&cleaned, "");
    let scenario = SCENARIO_ITEMS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| cleaned.contains(kw)))
        .map(|(label, _)| *label);
    let item = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let item = if !item.is_empty() {
        item
    } else if let Some(label) = scenario {
        label.to_string()
    } else {
        match kind {
            TransactionKind::Expense => "支出項目".to_string(),
            TransactionKind::Income => "收入項目".to_string(),
        }
    };

    let category = extract_category(text, scenario, kind);
    let account = extract_account(text);
    let date = extract_date(text, today);

    AccountingPayload {
        item,
        amount: amount.abs(),
        kind,
        category,
        account,
        date,
    }
}

fn extract_category(
    text: &str,
    scenario: Option<&str>,
    kind: TransactionKind,
) -> Option<String> {
    if let Some(caps) = CATEGORY_MARKER.captures(text) {
        let explicit = caps[1].trim();
        if !explicit.is_empty() {
            return Some(explicit.to_string());
        }
    }
    if let Some(label) = scenario {
        return Some(label.to_string());
    }
    let table = match kind {
        TransactionKind::Expense => EXPENSE_CATEGORIES,
        TransactionKind::Income => INCOME_CATEGORIES,
    };
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(name, _)| name.to_string())
}

/// Normalize a free-form account mention against the known account types;
/// an unrecognized mention is kept verbatim.
pub(crate) fn normalize_account(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    ACCOUNT_TYPES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(name, _)| name.to_string())
}

fn extract_account(text: &str) -> Option<String> {
    if let Some(caps) = ACCOUNT_MARKER.captures(text) {
        let explicit = caps[1].trim();
        if !explicit.is_empty() {
            return Some(explicit.to_string());
        }
    }
    for re in ACCOUNT_PHRASES.iter() {
        if let Some(caps) = re.captures(text) {
            let mention = caps[1].trim();
            if mention.is_empty() {
                continue;
            }
            return Some(normalize_account(mention).unwrap_or_else(|| mention.to_string()));
        }
    }
    // No payment phrase: look for a bare account keyword anywhere.
    normalize_account(text)
}

fn extract_date(text: &str, today: NaiveDate) -> NaiveDate {
    if let Some(caps) = DATE_MARKER.captures(text) {
        return datetime::parse_date_token(&caps[1], today).unwrap_or(today);
    }
    datetime::find_date(text, today).unwrap_or(today)
}
