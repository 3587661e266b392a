use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use landscape_quotes::domain::{DesignElement, ElementType, MeasurementUnit, RateCard, RateItem};
use landscape_quotes::services::validate_inputs;
use landscape_quotes::pricing::{
    generate_quote, round2, ComplexityAdjustment, PriceAdjustment, QuoteCalculator,
    SeasonalAdjustment,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn rate_card() -> RateCard {
    RateCard::new(Uuid::new_v4(), dec("45"), dec("20"), dec("150"))
        .with_rate_item(RateItem::new(
            ElementType::Patio,
            MeasurementUnit::Sqm,
            dec("50"),
            dec("2"),
        ))
        .with_rate_item(RateItem::new(
            ElementType::Fencing,
            MeasurementUnit::LinearM,
            dec("38.50"),
            dec("0.75"),
        ))
        .with_rate_item(RateItem::new(
            ElementType::Lighting,
            MeasurementUnit::Unit,
            dec("85"),
            dec("0.5"),
        ))
}

fn patio(quantity: &str) -> DesignElement {
    DesignElement::new(ElementType::Patio, dec(quantity), MeasurementUnit::Sqm)
}

#[test]
fn test_single_patio_scenario() {
    let quote = generate_quote(&[patio("25")], &rate_card());

    assert_eq!(quote.line_items.len(), 2);
    let line = &quote.line_items[0];
    assert_eq!(line.element_type, ElementType::Patio);
    assert_eq!(line.description, "Patio Installation (25m²)");
    assert_eq!(line.unit_price, dec("140.00"));
    assert_eq!(line.line_total, dec("3500.00"));

    let waste = &quote.line_items[1];
    assert_eq!(waste.element_type, ElementType::Other);
    assert_eq!(waste.description, "Waste Disposal & Site Cleanup");
    assert_eq!(waste.quantity, Decimal::ONE);
    assert_eq!(waste.unit, MeasurementUnit::Unit);
    assert_eq!(waste.unit_price, dec("150.00"));
    assert_eq!(waste.line_total, dec("150.00"));

    assert_eq!(quote.subtotal, dec("3650.00"));
    assert_eq!(quote.adjusted_subtotal, quote.subtotal);
    assert_eq!(quote.profit, dec("730.00"));
    assert_eq!(quote.total, dec("4380.00"));
    assert_eq!(quote.low_estimate, dec("3723.00"));
    assert_eq!(quote.high_estimate, dec("5037.00"));
    assert_eq!(quote.currency, "GBP");
    assert!(!quote.is_partial());
}

#[test]
fn test_unpriced_element_scenario() {
    let decking = DesignElement::new(ElementType::Decking, dec("10"), MeasurementUnit::Sqm);
    let quote = generate_quote(&[decking], &rate_card());

    assert!(quote.line_items.is_empty());
    assert_eq!(quote.subtotal, Decimal::ZERO);
    assert_eq!(quote.total, Decimal::ZERO);
    assert_eq!(quote.skipped_elements.len(), 1);
    assert_eq!(quote.skipped_elements[0].element_type, ElementType::Decking);
    assert!(quote.waste_disposal_line().is_none());
}

#[test]
fn test_empty_input() {
    let quote = generate_quote(&[], &rate_card());

    assert!(quote.line_items.is_empty());
    assert!(quote.skipped_elements.is_empty());
    for value in [
        quote.subtotal,
        quote.profit,
        quote.total,
        quote.low_estimate,
        quote.high_estimate,
    ] {
        assert_eq!(value, Decimal::ZERO);
    }
}

#[test]
fn test_unit_mismatch_is_skipped_without_fallback() {
    // Patio is only priced per m²
    let by_count = DesignElement::new(ElementType::Patio, dec("3"), MeasurementUnit::Unit);
    let quote = generate_quote(&[by_count, patio("10")], &rate_card());

    assert_eq!(quote.line_items.len(), 2);
    assert_eq!(quote.skipped_elements.len(), 1);
    assert_eq!(quote.skipped_elements[0].index, 0);
    assert_eq!(quote.skipped_elements[0].unit, MeasurementUnit::Unit);
    assert_eq!(quote.subtotal, dec("1550.00"));
}

fn mixed_elements() -> Vec<DesignElement> {
    vec![
        DesignElement::new(ElementType::Fencing, dec("12.5"), MeasurementUnit::LinearM)
            .with_note("Closeboard"),
        DesignElement::new(ElementType::Decking, dec("8"), MeasurementUnit::Sqm),
        DesignElement::new(ElementType::Lighting, dec("6"), MeasurementUnit::Unit),
        DesignElement::new(ElementType::Lighting, dec("1"), MeasurementUnit::Unit),
        patio("17.3"),
    ]
}

#[test]
fn test_line_items_keep_input_order_with_waste_last() {
    let quote = generate_quote(&mixed_elements(), &rate_card());

    let descriptions: Vec<&str> = quote
        .line_items
        .iter()
        .map(|item| item.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Fencing (12.5m linear) - Closeboard",
            "Garden Lighting (6 units)",
            "Garden Lighting",
            "Patio Installation (17.3m²)",
            "Waste Disposal & Site Cleanup",
        ]
    );
    assert_eq!(quote.skipped_elements.len(), 1);
    assert_eq!(quote.skipped_elements[0].index, 1);
}

#[test]
fn test_totals_are_consistent() {
    let card = rate_card();
    let quote = generate_quote(&mixed_elements(), &card);

    let sum: Decimal = quote.line_items.iter().map(|item| item.line_total).sum();
    assert_eq!(quote.subtotal, round2(sum));
    assert_eq!(
        quote.profit,
        round2(quote.subtotal * card.default_profit_margin_percent / Decimal::ONE_HUNDRED)
    );
    assert_eq!(quote.total, round2(quote.subtotal + quote.profit));
    assert_eq!(quote.low_estimate, round2(quote.total * dec("0.85")));
    assert_eq!(quote.high_estimate, round2(quote.total * dec("1.15")));
    assert!(quote.low_estimate <= quote.total && quote.total <= quote.high_estimate);

    let waste_lines = quote
        .line_items
        .iter()
        .filter(|item| item.element_type == ElementType::Other)
        .count();
    assert_eq!(waste_lines, 1);
    assert_eq!(
        quote.waste_disposal_line().map(|item| item.line_total),
        Some(card.waste_disposal_rate)
    );
}

#[test]
fn test_deterministic() {
    let card = rate_card();
    let elements = mixed_elements();
    assert_eq!(
        generate_quote(&elements, &card),
        generate_quote(&elements, &card)
    );
}

#[test]
fn test_adjustments_apply_before_margin() {
    let card = rate_card();
    let elements = vec![patio("25")];
    let seasonal = SeasonalAdjustment::for_month(6);
    let complexity = ComplexityAdjustment::from_elements(&elements);
    let adjustments: Vec<&dyn PriceAdjustment> = vec![&complexity, &seasonal];

    let quote = QuoteCalculator::default().generate_adjusted(&elements, &card, &adjustments);

    // 3650 × 1.1 (complexity) × 1.1 (peak season)
    assert_eq!(quote.subtotal, dec("3650.00"));
    assert_eq!(quote.adjustments.len(), 2);
    assert_eq!(quote.adjustments[0].amount, dec("4015.00"));
    assert_eq!(quote.adjusted_subtotal, dec("4416.50"));
    assert_eq!(quote.profit, dec("883.30"));
    assert_eq!(quote.total, dec("5299.80"));
}

#[test]
fn test_no_adjustments_matches_plain_quote() {
    let card = rate_card();
    let elements = mixed_elements();
    assert_eq!(
        QuoteCalculator::default().generate_adjusted(&elements, &card, &[]),
        generate_quote(&elements, &card)
    );
}

#[test]
fn test_rate_card_from_json() {
    let card: RateCard = serde_json::from_str(
        r#"{
            "labour_rate_per_hour": 45,
            "default_profit_margin_percent": 20,
            "waste_disposal_rate": 150,
            "rate_items": [
                {"element_type": "PATIO", "unit": "SQM", "base_material_cost": 50, "base_labour_hours_per_unit": 2}
            ]
        }"#,
    )
    .unwrap();

    let quote = generate_quote(&[patio("25")], &card);
    assert_eq!(quote.total, dec("4380.00"));
}

#[test]
fn test_unit_price_and_line_total_are_rounded_separately() {
    let card = RateCard::new(Uuid::new_v4(), dec("45"), dec("20"), dec("150"))
        .with_rate_item(RateItem::new(
            ElementType::Lighting,
            MeasurementUnit::Unit,
            dec("12.345"),
            Decimal::ZERO,
        ))
        .with_rate_item(RateItem::new(
            ElementType::Turf,
            MeasurementUnit::Sqm,
            dec("12"),
            dec("0.333"),
        ));
    let elements = [
        DesignElement::new(ElementType::Lighting, dec("10"), MeasurementUnit::Unit),
        DesignElement::new(ElementType::Turf, dec("7.5"), MeasurementUnit::Sqm),
    ];

    let quote = generate_quote(&elements, &card);

    let lighting = &quote.line_items[0];
    assert_eq!(lighting.unit_price, dec("12.35"));
    assert_eq!(lighting.line_total, dec("123.45"));
    assert_ne!(round2(lighting.unit_price * lighting.quantity), lighting.line_total);

    // 26.985 per m², 202.3875 for the line
    let turf = &quote.line_items[1];
    assert_eq!(turf.unit_price, dec("26.99"));
    assert_eq!(turf.line_total, dec("202.39"));
    assert_ne!(round2(turf.unit_price * turf.quantity), turf.line_total);

    assert_eq!(quote.subtotal, dec("475.84"));
    assert_eq!(quote.profit, dec("95.17"));
    assert_eq!(quote.total, dec("571.01"));
}

#[test]
fn test_out_of_range_inputs_rejected_before_pricing() {
    let mut card = rate_card();
    card.rate_items[0].base_material_cost = dec("10000000000");
    assert!(validate_inputs(&[patio("1")], &card).is_err());

    let card = rate_card();
    assert!(validate_inputs(&[patio("100000000000000000000")], &card).is_err());
    assert!(validate_inputs(&[patio("1000000")], &card).is_ok());
}
