//! # Printable Documents
//!
//! Builds the itemized breakdown printed on invoices and quotations.
//!
//! Lines come from the engine's own intermediates, never from a second
//! calculation, so the printed items always add up to the printed total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::billing::{BillTotals, BillingMode};
use crate::currency::format_currency;
use crate::money::Money;
use crate::records::{Bill, BusinessProfile, Quotation, QuotationItem};
use crate::types::{Distance, PaymentMethod, Percentage, PricingMode};
use crate::FALLBACK_DOCUMENT_COMPANY;

// =============================================================================
// Shared Pieces
// =============================================================================

/// One priced row of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentLine {
    pub label: String,
    /// How the amount was derived, e.g. `150.0 km @ Rs. 50.00`.
    pub detail: Option<String>,
    pub amount: Money,
}

impl DocumentLine {
    fn new(label: &str, amount: Money) -> Self {
        DocumentLine {
            label: label.to_string(),
            detail: None,
            amount,
        }
    }

    fn with_detail(label: &str, detail: String, amount: Money) -> Self {
        DocumentLine {
            label: label.to_string(),
            detail: Some(detail),
            amount,
        }
    }

    /// The amount as printed.
    pub fn formatted_amount(&self) -> String {
        format_currency(self.amount)
    }
}

/// Letterhead block taken from the business profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyHeader {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// `Bank: X, Branch: Y, Acc: Z, Name: W`, filled fields only.
    pub bank_details: Option<String>,
}

impl CompanyHeader {
    pub fn from_profile(profile: &BusinessProfile) -> Self {
        let name = if profile.company_name.trim().is_empty() {
            FALLBACK_DOCUMENT_COMPANY.to_string()
        } else {
            profile.company_name.clone()
        };

        let bank_details = profile.has_bank_details().then(|| {
            let parts = [
                ("Bank", &profile.bank_name),
                ("Branch", &profile.bank_branch),
                ("Acc", &profile.bank_account_no),
                ("Name", &profile.bank_account_name),
            ];
            parts
                .iter()
                .filter_map(|(label, value)| {
                    value
                        .as_deref()
                        .filter(|v| !v.trim().is_empty())
                        .map(|v| format!("{}: {}", label, v.trim()))
                })
                .collect::<Vec<_>>()
                .join(", ")
        });

        CompanyHeader {
            name,
            address: profile.address.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            website: profile.website.clone(),
            bank_details,
        }
    }
}

fn km(distance: Distance) -> String {
    format!("{:.1}", distance.km_f64())
}

/// One `label ... amount` row, amount right-aligned.
fn amount_row(label: &str, amount: Money) -> String {
    format!("{:<40} {:>18}", label, format_currency(amount))
}

fn line_rows(lines: &[DocumentLine]) -> impl Iterator<Item = String> + '_ {
    lines.iter().map(|line| match &line.detail {
        Some(detail) => amount_row(&format!("{} ({})", line.label, detail), line.amount),
        None => amount_row(&line.label, line.amount),
    })
}

/// Joins rows into the printed text, one row per line.
fn join_rows(rows: Vec<String>) -> String {
    let mut out = rows.join("\n");
    out.push('\n');
    out
}

// =============================================================================
// Invoice
// =============================================================================

/// Everything printed on a bill.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDocument {
    pub company: CompanyHeader,
    pub bill_number: i64,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub vehicle_no: String,
    pub route: String,
    pub totals: BillTotals,
    /// Charge lines. They add up to `total`.
    pub lines: Vec<DocumentLine>,
    pub total: Money,
    pub advance: Money,
    pub balance_due: Money,
    pub payment_method: PaymentMethod,
    pub currency: String,
    /// Total in base currency, for bills priced in another currency.
    pub total_in_base: Option<Money>,
}

impl InvoiceDocument {
    pub fn from_bill(bill: &Bill, profile: &BusinessProfile) -> Self {
        let totals = bill.totals();

        let mileage_detail = match totals.mode {
            BillingMode::Standard => format!(
                "{} - {} = {} km @ {}",
                km(bill.end_meter),
                km(bill.start_meter),
                km(totals.distance),
                format_currency(bill.hire_rate)
            ),
            BillingMode::Package => format!(
                "{} km, {} km included, {} km excess @ {}",
                km(totals.distance),
                km(bill.allowed_distance),
                km(totals.excess_distance),
                format_currency(bill.hire_rate)
            ),
        };

        let lines = vec![
            DocumentLine::with_detail("Mileage Cost", mileage_detail, totals.base_charge),
            DocumentLine::new("Waiting Charges", bill.waiting_charge.non_negative()),
            DocumentLine::new("Gate Pass", bill.gate_pass.non_negative()),
            DocumentLine::new("Package Charge", bill.package_charge.non_negative()),
        ];

        InvoiceDocument {
            company: CompanyHeader::from_profile(profile),
            bill_number: bill.bill_number,
            issued_at: bill.created_at,
            customer_name: bill.customer_name.clone(),
            customer_address: bill.customer_address.clone(),
            vehicle_no: bill.vehicle_no.clone(),
            route: bill.route.clone(),
            totals,
            lines,
            total: totals.total_amount,
            advance: bill.advance_amount.non_negative(),
            balance_due: totals.balance_due,
            payment_method: bill.payment_method,
            currency: bill.currency.clone(),
            total_in_base: (!bill.is_base_currency()).then_some(bill.total_amount_base),
        }
    }

    /// Plain-text rendering, one line per row.
    pub fn to_text(&self) -> String {
        let mut rows = vec![
            self.company.name.clone(),
            format!("INVOICE #{:04}  {}", self.bill_number, self.issued_at.format("%Y-%m-%d")),
            format!("Customer: {}", self.customer_name),
            format!("Vehicle: {}  Route: {}", self.vehicle_no, self.route),
        ];
        rows.extend(line_rows(&self.lines));
        rows.push(amount_row("TOTAL", self.total));
        if self.advance.is_positive() {
            rows.push(amount_row("Advance", self.advance));
            rows.push(amount_row("Balance Due", self.balance_due));
        }
        rows.push(format!("Payment: {}", self.payment_method.as_str()));
        rows.extend(self.company.bank_details.clone());
        join_rows(rows)
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// One day of the printed itinerary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItineraryRow {
    pub day_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub distance: Distance,
    pub accommodation: Money,
    pub meals: Money,
    pub activities: Money,
    pub other_costs: Money,
    pub day_total: Money,
}

/// Everything printed on a quotation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotationDocument {
    pub company: CompanyHeader,
    pub quotation_number: i64,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub schedule_name: String,
    pub days: i64,
    pub number_of_persons: i64,
    pub itinerary: Vec<ItineraryRow>,
    /// Cost lines. They add up to `subtotal`.
    pub cost_lines: Vec<DocumentLine>,
    pub subtotal: Money,
    /// Markup and discount, each present only when non-zero.
    pub adjustments: Vec<DocumentLine>,
    pub total: Money,
    pub advance: Money,
    pub balance_due: Money,
    pub excluded_items: Vec<String>,
    pub notes: Option<String>,
}

impl QuotationDocument {
    /// Builds the printed quotation from the quotation and the itinerary
    /// snapshot taken when it was generated. Later edits to the tour
    /// schedule never reach the document.
    pub fn from_quotation(
        quotation: &Quotation,
        items: &[QuotationItem],
        profile: &BusinessProfile,
    ) -> Self {
        let itinerary = items
            .iter()
            .map(|item| ItineraryRow {
                day_number: item.day_number,
                title: item.title.clone(),
                description: item.description.clone(),
                distance: item.distance,
                accommodation: item.accommodation,
                meals: item.meals,
                activities: item.activities,
                other_costs: item.other_costs,
                day_total: item.day_total(),
            })
            .collect();

        let mut cost_lines = Vec::with_capacity(6);
        match quotation.pricing_mode {
            PricingMode::PerKm => cost_lines.push(DocumentLine::with_detail(
                "Transport",
                format!(
                    "{} km × {}/km",
                    km(quotation.total_distance),
                    format_currency(quotation.hire_rate_per_km)
                ),
                quotation.transport_cost,
            )),
            PricingMode::PerDay => {
                cost_lines.push(DocumentLine::with_detail(
                    "Transport",
                    format!("{} days × {}/day", quotation.days, format_currency(quotation.hire_rate_per_day)),
                    quotation.transport_cost,
                ));
                cost_lines.push(DocumentLine::with_detail(
                    "Driver",
                    format!("{} days × {}/day", quotation.days, format_currency(quotation.driver_cost_per_day)),
                    quotation.driver_cost_total,
                ));
            }
        }
        cost_lines.push(DocumentLine::new("Accommodation", quotation.accommodation_total));
        cost_lines.push(DocumentLine::new("Meals", quotation.meals_total));
        cost_lines.push(DocumentLine::new("Activities", quotation.activities_total));
        cost_lines.push(DocumentLine::new("Other Costs", quotation.other_costs_total));

        let mut adjustments = Vec::new();
        if quotation.markup > Percentage::zero() {
            adjustments.push(DocumentLine::with_detail(
                "Markup",
                quotation.markup.to_string(),
                quotation.markup_amount,
            ));
        }
        if quotation.discount.is_positive() {
            // The total floors at zero, so the discount printed is the part
            // that was actually taken off.
            let applied = (quotation.subtotal + quotation.markup_amount - quotation.total_amount)
                .non_negative();
            let line = if applied < quotation.discount {
                DocumentLine::with_detail(
                    "Discount",
                    format!("{} requested, capped at the total", format_currency(quotation.discount)),
                    Money::zero() - applied,
                )
            } else {
                DocumentLine::new("Discount", Money::zero() - applied)
            };
            adjustments.push(line);
        }

        let excluded_items = quotation
            .excluded_items
            .as_deref()
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        QuotationDocument {
            company: CompanyHeader::from_profile(profile),
            quotation_number: quotation.quotation_number,
            issued_at: quotation.created_at,
            valid_until: quotation.valid_until,
            customer_name: quotation.customer_name.clone(),
            schedule_name: quotation.schedule_name.clone(),
            days: quotation.days,
            number_of_persons: quotation.number_of_persons,
            itinerary,
            cost_lines,
            subtotal: quotation.subtotal,
            adjustments,
            total: quotation.total_amount,
            advance: quotation.advance_amount.non_negative(),
            balance_due: quotation.balance_due(),
            excluded_items,
            notes: quotation.notes.clone(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut rows = vec![
            self.company.name.clone(),
            format!("QUOTATION #{:04}  {}", self.quotation_number, self.issued_at.format("%Y-%m-%d")),
            format!("Customer: {}  Persons: {}", self.customer_name, self.number_of_persons),
            format!("Tour: {} ({} days)", self.schedule_name, self.days),
        ];
        rows.extend(self.itinerary.iter().map(|row| {
            format!(
                "Day {}: {} ({} km) {}",
                row.day_number,
                row.title,
                km(row.distance),
                format_currency(row.day_total)
            )
        }));
        rows.extend(line_rows(&self.cost_lines));
        rows.push(amount_row("Subtotal", self.subtotal));
        rows.extend(line_rows(&self.adjustments));
        rows.push(amount_row("TOTAL", self.total));
        if self.advance.is_positive() {
            rows.push(amount_row("Advance", self.advance));
            rows.push(amount_row("Balance", self.balance_due));
        }
        rows.extend(self.excluded_items.iter().map(|item| format!("Excludes: {}", item)));
        join_rows(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{ExchangeRate, DEFAULT_CURRENCY};
    use crate::quotation::{compute_quotation_from_costs, PricingStrategy, QuotationInput};
    use crate::types::QuotationStatus;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn profile() -> BusinessProfile {
        BusinessProfile {
            id: "p-1".to_string(),
            company_name: "Lanka Tours".to_string(),
            address: Some("12 Galle Road, Colombo".to_string()),
            phone: None,
            email: None,
            website: None,
            logo_url: None,
            bank_name: Some("BOC".to_string()),
            bank_branch: None,
            bank_account_no: Some("0071234".to_string()),
            bank_account_name: None,
            usd_rate: ExchangeRate::from_f64(300.0),
            created_at: at(),
            updated_at: at(),
        }
    }

    fn package_bill() -> Bill {
        Bill {
            id: "b-1".to_string(),
            bill_number: 7,
            vehicle_no: "VAN-5566".to_string(),
            customer_name: "Kamal".to_string(),
            customer_address: None,
            route: "Colombo - Galle".to_string(),
            start_meter: Distance::zero(),
            end_meter: Distance::from_km(120),
            hire_rate: Money::from_major(30),
            allowed_distance: Distance::from_km(100),
            package_charge: Money::from_major(5000),
            waiting_charge: Money::zero(),
            gate_pass: Money::zero(),
            advance_amount: Money::from_major(600),
            currency: DEFAULT_CURRENCY.to_string(),
            exchange_rate: ExchangeRate::ONE,
            payment_method: PaymentMethod::Credit,
            total_amount: Money::from_major(5600),
            total_amount_base: Money::from_major(5600),
            booking_id: None,
            created_at: at(),
            updated_at: at(),
        }
    }

    #[test]
    fn test_invoice_lines_reconcile_in_package_mode() {
        let doc = InvoiceDocument::from_bill(&package_bill(), &profile());

        let sum: Money = doc.lines.iter().map(|l| l.amount).sum();
        assert_eq!(sum, doc.total);
        assert_eq!(doc.total, Money::from_major(5600));
        assert_eq!(doc.lines[0].amount, Money::from_major(600));
        assert_eq!(
            doc.lines[0].detail.as_deref(),
            Some("120.0 km, 100.0 km included, 20.0 km excess @ Rs. 30.00")
        );
        assert_eq!(doc.balance_due, Money::from_major(5000));
        assert_eq!(doc.total_in_base, None);
    }

    #[test]
    fn test_invoice_standard_mileage_detail() {
        let bill = Bill {
            start_meter: Distance::from_km(100),
            end_meter: Distance::from_km(250),
            hire_rate: Money::from_major(50),
            allowed_distance: Distance::zero(),
            package_charge: Money::zero(),
            waiting_charge: Money::from_major(200),
            gate_pass: Money::from_major(100),
            total_amount: Money::from_major(7800),
            ..package_bill()
        };
        let doc = InvoiceDocument::from_bill(&bill, &profile());
        assert_eq!(
            doc.lines[0].detail.as_deref(),
            Some("250.0 - 100.0 = 150.0 km @ Rs. 50.00")
        );
        assert!(doc.to_text().contains("Rs. 7,800.00"));
    }

    #[test]
    fn test_invoice_foreign_currency_shows_base_total() {
        let bill = Bill {
            currency: "USD".to_string(),
            exchange_rate: ExchangeRate::from_f64(300.0),
            total_amount_base: Money::from_major(1_680_000),
            ..package_bill()
        };
        let doc = InvoiceDocument::from_bill(&bill, &profile());
        assert_eq!(doc.total_in_base, Some(Money::from_major(1_680_000)));
    }

    #[test]
    fn test_company_header_fallback_and_bank() {
        let mut p = profile();
        let header = CompanyHeader::from_profile(&p);
        assert_eq!(header.bank_details.as_deref(), Some("Bank: BOC, Acc: 0071234"));

        p.company_name = "  ".to_string();
        assert_eq!(CompanyHeader::from_profile(&p).name, "TourBiller Transport");
    }

    fn snapshot() -> Vec<QuotationItem> {
        let item = |n: i64, km: i64, acc: i64, meals: i64| QuotationItem {
            id: format!("qi-{}", n),
            quotation_id: "q-1".to_string(),
            day_number: n,
            title: format!("Day {}", n),
            description: None,
            distance: Distance::from_km(km),
            accommodation: Money::from_major(acc),
            meals: Money::from_major(meals),
            activities: Money::zero(),
            other_costs: Money::zero(),
        };
        vec![item(1, 100, 12_000, 4_000), item(2, 60, 0, 2_000)]
    }

    fn quotation_for(items: &[QuotationItem], input: &QuotationInput) -> Quotation {
        let pricing = compute_quotation_from_costs(items.iter().map(QuotationItem::costs), input);
        let (rate_km, rate_day, driver) = match input.strategy {
            PricingStrategy::PerKm { hire_rate_per_km } => (hire_rate_per_km, Money::zero(), Money::zero()),
            PricingStrategy::PerDay {
                hire_rate_per_day,
                driver_cost_per_day,
            } => (Money::zero(), hire_rate_per_day, driver_cost_per_day),
        };
        Quotation {
            id: "q-1".to_string(),
            quotation_number: 3,
            tour_schedule_id: "s-1".to_string(),
            schedule_name: "Hill Country Tea Trail".to_string(),
            days: input.schedule_days,
            customer_name: "Sarah".to_string(),
            customer_email: None,
            customer_phone: None,
            vehicle_no: None,
            number_of_persons: 2,
            start_date: None,
            pricing_mode: pricing.mode,
            hire_rate_per_km: rate_km,
            hire_rate_per_day: rate_day,
            driver_cost_per_day: driver,
            km_per_day: Distance::zero(),
            markup: input.markup,
            discount: input.discount,
            advance_amount: Money::from_major(5_000),
            total_distance: pricing.sums.total_distance,
            transport_cost: pricing.transport_cost,
            driver_cost_total: pricing.driver_cost_total,
            accommodation_total: pricing.sums.accommodation_total,
            meals_total: pricing.sums.meals_total,
            activities_total: pricing.sums.activities_total,
            other_costs_total: pricing.sums.other_costs_total,
            subtotal: pricing.subtotal,
            markup_amount: pricing.markup_amount,
            total_amount: pricing.total_amount,
            excluded_items: Some("Entrance tickets\n\nPersonal expenses".to_string()),
            notes: None,
            valid_until: None,
            status: QuotationStatus::Draft,
            created_at: at(),
            updated_at: at(),
        }
    }

    #[test]
    fn test_quotation_lines_reconcile() {
        let items = snapshot();
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: Money::from_major(8_000),
                driver_cost_per_day: Money::from_major(2_000),
            },
            schedule_days: 2,
            markup: Percentage::from_bps(1000),
            discount: Money::from_major(500),
        };
        let quotation = quotation_for(&items, &input);
        let doc = QuotationDocument::from_quotation(&quotation, &items, &profile());

        let cost_sum: Money = doc.cost_lines.iter().map(|l| l.amount).sum();
        assert_eq!(cost_sum, doc.subtotal);

        let adjusted: Money = doc.adjustments.iter().map(|l| l.amount).sum();
        assert_eq!(doc.subtotal + adjusted, doc.total);
        assert_eq!(doc.adjustments.len(), 2);
        assert_eq!(doc.itinerary[0].day_total, Money::from_major(16_000));
        assert_eq!(doc.excluded_items, vec!["Entrance tickets", "Personal expenses"]);
        assert_eq!(doc.balance_due, doc.total - Money::from_major(5_000));
    }

    #[test]
    fn test_quotation_hides_zero_markup_and_discount() {
        let items = snapshot();
        let input = QuotationInput {
            strategy: PricingStrategy::PerKm {
                hire_rate_per_km: Money::from_major(50),
            },
            schedule_days: 2,
            ..QuotationInput::default()
        };
        let quotation = quotation_for(&items, &input);
        let doc = QuotationDocument::from_quotation(&quotation, &items, &profile());

        assert!(doc.adjustments.is_empty());
        // per-km pricing has no driver line
        assert!(doc.cost_lines.iter().all(|l| l.label != "Driver"));
        assert_eq!(
            doc.cost_lines[0].detail.as_deref(),
            Some("160.0 km × Rs. 50.00/km")
        );
        assert_eq!(doc.total, Money::from_major(8_000 + 18_000));
    }

    #[test]
    fn test_quotation_text_has_one_line_per_row() {
        let items = snapshot();
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: Money::from_major(8_000),
                driver_cost_per_day: Money::from_major(2_000),
            },
            schedule_days: 2,
            markup: Percentage::from_bps(1000),
            discount: Money::from_major(500),
        };
        let quotation = quotation_for(&items, &input);
        let text = QuotationDocument::from_quotation(&quotation, &items, &profile()).to_text();

        assert!(text.ends_with("Excludes: Personal expenses\n"));
        let lines: Vec<&str> = text.lines().collect();
        // header 4, days 2, costs 6, subtotal, markup + discount, total,
        // advance + balance, exclusions 2
        assert_eq!(lines.len(), 20);
        assert_eq!(lines[3], "Tour: Hill Country Tea Trail (2 days)");
        assert_eq!(lines[4], "Day 1: Day 1 (100.0 km) Rs. 16,000.00");
    }

    #[test]
    fn test_quotation_uses_stored_days_and_itinerary() {
        let items = snapshot();
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: Money::from_major(8_000),
                driver_cost_per_day: Money::from_major(2_000),
            },
            schedule_days: 2,
            ..QuotationInput::default()
        };
        let quotation = quotation_for(&items, &input);
        let doc = QuotationDocument::from_quotation(&quotation, &items, &profile());

        assert_eq!(doc.days, 2);
        assert_eq!(doc.schedule_name, "Hill Country Tea Trail");
        assert_eq!(
            doc.cost_lines[0].detail.as_deref(),
            Some("2 days × Rs. 8,000.00/day")
        );
        let accommodation: Money = doc.itinerary.iter().map(|row| row.accommodation).sum();
        assert_eq!(accommodation, quotation.accommodation_total);
    }

    #[test]
    fn test_discount_above_total_is_capped_on_the_page() {
        let items = snapshot();
        let input = QuotationInput {
            strategy: PricingStrategy::PerKm {
                hire_rate_per_km: Money::from_major(50),
            },
            schedule_days: 2,
            markup: Percentage::from_bps(1000),
            discount: Money::from_major(100_000),
        };
        let quotation = quotation_for(&items, &input);
        assert_eq!(quotation.total_amount, Money::zero());

        let doc = QuotationDocument::from_quotation(&quotation, &items, &profile());
        let adjusted: Money = doc.adjustments.iter().map(|l| l.amount).sum();
        assert_eq!(doc.subtotal + adjusted, doc.total);

        let discount = doc
            .adjustments
            .iter()
            .find(|l| l.label == "Discount")
            .unwrap();
        assert_eq!(discount.amount, Money::zero() - (quotation.subtotal + quotation.markup_amount));
        assert_eq!(
            discount.detail.as_deref(),
            Some("Rs. 100,000.00 requested, capped at the total")
        );
    }
}
