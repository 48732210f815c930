//! Ingestion schema
//!
//! Everything that ties the gateway to one particular workbook layout: sheet
//! names, header keywords per field, store aliases and the reference time
//! zone. [`Schema::default`] describes the salon workbook; a JSON file with
//! the same shape (camelCase keys, any subset) replaces it.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::{AppError, AppResult, ErrorCode};
use std::path::Path;

use super::columns::ClaimPolicy;

/// Header keywords recognized for one logical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldKeywords {
    pub field: String,
    pub keywords: Vec<String>,
    /// Header text must equal a keyword instead of containing it
    #[serde(default)]
    pub exact: bool,
}

impl FieldKeywords {
    pub fn new(field: &str, keywords: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            exact: false,
        }
    }

    /// Keywords that only match a header cell equal to them
    pub fn exact(field: &str, keywords: &[&str]) -> Self {
        Self {
            exact: true,
            ..Self::new(field, keywords)
        }
    }
}

/// Canonical store identifier and the spellings that map to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAlias {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Intake-form sheet belonging to one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSheet {
    pub store: String,
    pub sheet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    pub sales_sheet: String,
    /// Key/value sheet for goals, salaries, settings and staff
    pub config_sheet: String,
    /// Key/value sheet for the credential set
    pub auth_sheet: String,
    pub intake_sheets: Vec<IntakeSheet>,
    /// Declaration order matters under [`ClaimPolicy::Exclusive`]
    pub sales_fields: Vec<FieldKeywords>,
    pub intake_fields: Vec<FieldKeywords>,
    pub store_aliases: Vec<StoreAlias>,
    pub time_zone: Tz,
    /// Rewrite typed date text to `YYYY/M/D`
    pub normalize_text_dates: bool,
    pub claim_policy: ClaimPolicy,
}

// Logical sales field paths (mirror the SalesEntry JSON shape)
pub mod sales_field {
    pub const ID: &str = "id";
    pub const DATE: &str = "date";
    pub const STORE: &str = "store";
    pub const STAFF: &str = "staff";
    pub const CASH: &str = "sales.cash";
    pub const CREDIT: &str = "sales.credit";
    pub const QR: &str = "sales.qr";
    pub const PRODUCT: &str = "sales.product";
    pub const HPB_POINTS: &str = "discounts.hpbPoints";
    pub const HPB_GIFT: &str = "discounts.hpbGift";
    pub const OTHER_DISCOUNT: &str = "discounts.other";
    pub const REFUND: &str = "discounts.refund";
    pub const NEW_PRIMARY: &str = "customerCounts.newPrimaryChannel";
    pub const NEW_SECONDARY: &str = "customerCounts.newSecondaryChannel";
    pub const EXISTING: &str = "customerCounts.existing";
    pub const ACQUAINTANCE: &str = "customerCounts.acquaintance";
    pub const NEXT_NEW_PRIMARY: &str = "nextBookings.newPrimaryChannel";
    pub const NEXT_NEW_SECONDARY: &str = "nextBookings.newSecondaryChannel";
    pub const NEXT_EXISTING: &str = "nextBookings.existing";
    pub const REVIEW_COUNT: &str = "reviewCount";
    pub const BLOG_UPDATE_COUNT: &str = "blogUpdateCount";
    pub const SNS_UPDATE_COUNT: &str = "snsUpdateCount";
}

// Intake fields with a fixed meaning; every other intake field is a free-text topic
pub mod intake_field {
    pub const DATE: &str = "date";
    pub const NAME: &str = "name";
}

impl Default for Schema {
    fn default() -> Self {
        use sales_field::*;

        // Next-booking columns come first so they claim "次回予約…" headers
        // before the plain customer-count fields can.
        let sales_fields = vec![
            // Short enough to hide inside "Paid" or "Valid"
            FieldKeywords::exact(ID, &["id"]),
            FieldKeywords::new(DATE, &["日付", "date"]),
            FieldKeywords::new(STORE, &["店舗", "store"]),
            FieldKeywords::new(STAFF, &["担当", "スタッフ", "staff"]),
            FieldKeywords::new(NEXT_NEW_PRIMARY, &["次回予約新規hpb", "次回新規hpb"]),
            FieldKeywords::new(NEXT_NEW_SECONDARY, &["次回予約新規その他", "次回新規その他"]),
            FieldKeywords::new(NEXT_EXISTING, &["次回予約既存", "次回既存"]),
            FieldKeywords::new(CASH, &["現金", "cash"]),
            FieldKeywords::new(CREDIT, &["クレジット", "カード", "credit"]),
            FieldKeywords::new(QR, &["qr"]),
            FieldKeywords::new(PRODUCT, &["物販", "product"]),
            FieldKeywords::new(HPB_POINTS, &["ポイント", "points"]),
            FieldKeywords::new(HPB_GIFT, &["ギフト", "gift"]),
            FieldKeywords::new(OTHER_DISCOUNT, &["その他割引", "other discount"]),
            FieldKeywords::new(REFUND, &["返金", "refund"]),
            FieldKeywords::new(NEW_PRIMARY, &["新規hpb", "new hpb"]),
            FieldKeywords::new(NEW_SECONDARY, &["新規その他", "new other"]),
            FieldKeywords::new(EXISTING, &["既存", "existing"]),
            FieldKeywords::new(ACQUAINTANCE, &["紹介", "知人", "acquaintance"]),
            FieldKeywords::new(REVIEW_COUNT, &["口コミ", "review"]),
            FieldKeywords::new(BLOG_UPDATE_COUNT, &["ブログ", "blog"]),
            FieldKeywords::new(SNS_UPDATE_COUNT, &["sns"]),
        ];

        // Kana before name: "お名前（フリガナ）" belongs to kana.
        let intake_fields = vec![
            FieldKeywords::new(intake_field::DATE, &["タイムスタンプ", "来店日", "日付", "date"]),
            FieldKeywords::new("kana", &["フリガナ", "ふりがな", "カナ", "kana"]),
            FieldKeywords::new(intake_field::NAME, &["氏名", "名前", "name"]),
            FieldKeywords::new("gender", &["性別", "gender"]),
            FieldKeywords::new("age", &["年齢", "age"]),
            FieldKeywords::new("birthday", &["生年月日", "誕生日", "birthday"]),
            FieldKeywords::new("phone", &["電話", "phone", "tel"]),
            FieldKeywords::new("email", &["メール", "mail"]),
            FieldKeywords::new("address", &["住所", "address"]),
            FieldKeywords::new("referral", &["きっかけ", "知った", "referral"]),
            FieldKeywords::new("visitHistory", &["来店歴", "来店回数", "初めて"]),
            FieldKeywords::new("hairConcern", &["髪", "ヘア", "hair"]),
            FieldKeywords::new("skinConcern", &["肌", "スキン", "skin"]),
            FieldKeywords::new("bodyConcern", &["ボディ", "身体", "body"]),
            FieldKeywords::new("requests", &["要望", "リクエスト", "request"]),
            FieldKeywords::new("notes", &["備考", "その他", "note"]),
        ];

        Self {
            sales_sheet: "売上".into(),
            config_sheet: "config".into(),
            auth_sheet: "auth".into(),
            intake_sheets: vec![
                IntakeSheet { store: "chiba".into(), sheet: "問診票_千葉".into() },
                IntakeSheet { store: "funabashi".into(), sheet: "問診票_船橋".into() },
                IntakeSheet { store: "kashiwa".into(), sheet: "問診票_柏".into() },
            ],
            sales_fields,
            intake_fields,
            store_aliases: vec![
                StoreAlias { canonical: "chiba".into(), aliases: vec!["千葉".into(), "chiba".into()] },
                StoreAlias {
                    canonical: "funabashi".into(),
                    aliases: vec!["船橋".into(), "funabashi".into()],
                },
                StoreAlias { canonical: "kashiwa".into(), aliases: vec!["柏".into(), "kashiwa".into()] },
            ],
            time_zone: chrono_tz::Asia::Tokyo,
            normalize_text_dates: false,
            claim_policy: ClaimPolicy::Exclusive,
        }
    }
}

impl Schema {
    /// Load from a JSON file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::with_message(
                ErrorCode::SchemaInvalid,
                format!("Cannot read schema {}: {e}", path.display()),
            )
        })?;
        let schema: Schema = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::with_message(
                ErrorCode::SchemaInvalid,
                format!("Invalid schema {}: {e}", path.display()),
            )
        })?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> AppResult<()> {
        let invalid = |msg: String| Err(AppError::with_message(ErrorCode::SchemaInvalid, msg));

        for (label, name) in [
            ("salesSheet", &self.sales_sheet),
            ("configSheet", &self.config_sheet),
            ("authSheet", &self.auth_sheet),
        ] {
            if name.trim().is_empty() {
                return invalid(format!("{label} must not be empty"));
            }
        }

        for group in self.sales_fields.iter().chain(&self.intake_fields) {
            if !group.keywords.iter().any(|k| !k.trim().is_empty()) {
                return invalid(format!("Field {} has no keywords", group.field));
            }
        }

        for required in [sales_field::DATE, sales_field::STORE, sales_field::STAFF] {
            if !self.sales_fields.iter().any(|g| g.field == required) {
                return invalid(format!("Sales field {required} is required"));
            }
        }

        Ok(())
    }

    /// Header row used when the sales sheet has to be created
    pub fn default_sales_header(&self) -> Vec<String> {
        self.sales_fields
            .iter()
            .filter_map(|g| g.keywords.first())
            .map(|k| k.to_uppercase())
            .collect()
    }

    pub fn intake_sheet_for(&self, store: &str) -> Option<&IntakeSheet> {
        self.intake_sheets.iter().find(|s| s.store == store)
    }

    /// Topic fields carried on every intake entry
    pub fn intake_topics(&self) -> impl Iterator<Item = &str> {
        self.intake_fields
            .iter()
            .map(|g| g.field.as_str())
            .filter(|f| *f != intake_field::DATE)
    }
}
