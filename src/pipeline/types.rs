use serde::{Deserialize, Serialize};

/// Result of the token extraction stage.
///
/// `raw_tokens` preserves document order and duplicates; tokens may still
/// contain OCR-confusable characters (`l`, `I`, `O`) that the normalizer
/// repairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenScan {
    pub raw_tokens: Vec<String>,
    pub currency_hint: Option<Currency>,
}

/// A raw token paired with its normalization outcome.
///
/// One entry per extracted token, in extraction order. Tokens that fail
/// integer conversion keep their slot with `value: None`, so the raw↔value
/// pairing used by the classifier can never desynchronize.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedToken {
    pub raw: String,
    pub value: Option<i64>,
}

/// Currency markers recognized in document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "RS")]
    Rs,
    #[serde(rename = "$")]
    Dollar,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    /// Map a surface marker (any case) to its currency. Returns `None`
    /// for text that is not a recognized marker.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.to_ascii_uppercase().as_str() {
            "INR" => Some(Currency::Inr),
            "RS" => Some(Currency::Rs),
            "$" => Some(Currency::Dollar),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            _ => None,
        }
    }

    /// Uppercased wire representation of the marker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Rs => "RS",
            Currency::Dollar => "$",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role of a classified amount — the seven fixed categories the
/// oracle must choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    TotalBill,
    Paid,
    Due,
    Tax,
    Discount,
    ItemCost,
    OtherFee,
}

/// A single classification produced by the oracle.
///
/// Deserialization is strict on the required shape: an unknown `type` or a
/// missing field fails the whole response, never a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAmount {
    #[serde(rename = "type")]
    pub kind: AmountKind,
    pub value: f64,
    pub raw_token: String,
}

/// A classified amount with its textual evidence.
///
/// `source` is either `text: '…'` (an excerpt of the original document
/// around the raw token) or `token: '…'` (the bare token, when no
/// contextual match was found).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceRecord {
    #[serde(rename = "type")]
    pub kind: AmountKind,
    pub value: f64,
    pub source: String,
}

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Ok,
    NoAmountsFound,
    Error,
}

/// Terminal aggregate of one pipeline run. No persistence beyond the
/// response; every stage failure is folded into `status` + `reason`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub amounts: Vec<ProvenanceRecord>,
    pub model_confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl PipelineResult {
    /// Benign terminal outcome: nothing usable was found at some stage.
    pub fn no_amounts(reason: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::NoAmountsFound,
            currency: None,
            amounts: Vec::new(),
            model_confidence: 0.0,
            reason: Some(reason.into()),
            raw_text: None,
        }
    }

    /// Server-side failure (configuration), distinct from benign outcomes.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Error,
            currency: None,
            amounts: Vec::new(),
            model_confidence: 0.0,
            reason: Some(reason.into()),
            raw_text: None,
        }
    }

    /// Successful run with classified, provenance-resolved amounts.
    pub fn ok(
        currency: Currency,
        amounts: Vec<ProvenanceRecord>,
        model_confidence: f32,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            status: PipelineStatus::Ok,
            currency: Some(currency),
            amounts,
            model_confidence,
            reason: None,
            raw_text: Some(raw_text.into()),
        }
    }
}
