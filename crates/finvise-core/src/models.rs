//! Domain models for FinVise

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Housing,
    Food,
    Transport,
    Entertainment,
    Shopping,
    Health,
    Education,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [Category] {
        &[
            Self::Housing,
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Shopping,
            Self::Health,
            Self::Education,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dated income or expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Always positive; direction comes from `kind`
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// A transaction entered by the user, before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl NewTransaction {
    pub fn expense(amount: f64, category: Category, description: &str, date: NaiveDate) -> Self {
        Self {
            amount,
            category,
            description: description.to_string(),
            date,
            kind: TransactionType::Expense,
        }
    }

    pub fn income(amount: f64, category: Category, description: &str, date: NaiveDate) -> Self {
        Self {
            amount,
            category,
            description: description.to_string(),
            date,
            kind: TransactionType::Income,
        }
    }

    /// Attach an identifier, producing the stored form
    pub fn with_id(self, id: String) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            kind: self.kind,
        }
    }
}

/// Per-category spending ceiling and running total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: Category,
    pub limit: f64,
    pub spent: f64,
}

impl Budget {
    pub fn new(category: Category, limit: f64, spent: f64) -> Self {
        Self {
            category,
            limit,
            spent,
        }
    }

    /// Fraction of the limit used, clamped to [0, 1] for progress bars
    pub fn utilization(&self) -> f64 {
        if self.limit <= 0.0 {
            return if self.spent > 0.0 { 1.0 } else { 0.0 };
        }
        (self.spent / self.limit).clamp(0.0, 1.0)
    }

    /// Amount left before the limit; negative when overspent
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    pub fn is_over(&self) -> bool {
        self.spent > self.limit
    }
}

/// A savings target with progress and deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target: f64,
    pub current: f64,
    pub deadline: NaiveDate,
}

impl SavingsGoal {
    /// Fraction of the target reached, clamped to [0, 1]
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }
}

/// Display currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "$")]
    Usd,
    #[serde(rename = "€")]
    Eur,
    #[serde(rename = "£")]
    Gbp,
    #[serde(rename = "¥")]
    Jpy,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Jpy => "¥",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
        }
    }

    /// Format an amount with this currency's symbol, e.g. `$1,234.50`
    pub fn format(&self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        let cents = (amount.abs() * 100.0).round() as u64;
        let whole = (cents / 100).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{}{}{}.{:02}", sign, self.symbol(), grouped, cents % 100)
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "$" | "USD" => Ok(Self::Usd),
            "€" | "EUR" => Ok(Self::Eur),
            "£" | "GBP" => Ok(Self::Gbp),
            "¥" | "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.symbol())
    }
}

/// Display-only user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub currency: Currency,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            currency: Currency::Usd,
        }
    }
}

/// Impact rating of an AI insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown impact: {}", s)),
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A short AI-generated advisory note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIInsight {
    pub title: String,
    pub advice: String,
    pub impact: Impact,
}

/// A citation returned alongside chat text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            sources: Vec::new(),
        }
    }

    /// Empty assistant placeholder that a stream fills in
    pub fn assistant_placeholder() -> Self {
        Self {
            role: ChatRole::Assistant,
            content: String::new(),
            sources: Vec::new(),
        }
    }

    /// Merge sources, keeping the first-seen title for each uri
    pub fn merge_sources<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = GroundingSource>,
    {
        for source in incoming {
            if !self.sources.iter().any(|s| s.uri == source.uri) {
                self.sources.push(source);
            }
        }
    }
}
