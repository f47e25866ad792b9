use storefront_api::{
    cart::{Cart, CartError, CartLine, CheckoutTotals, ProductSnapshot, clamp_quantity},
    error::AppError,
    models::{DeliveryMethod, OrderStatus, PaymentType, Review},
    routes::params::Pagination,
    services::{
        bill_service::build_bill_number, checkout_service::{ensure_fulfillable, order_history_url},
        order_service::validate_transition, review_service::average_rating,
    },
};
use chrono::Utc;
use uuid::Uuid;

fn snapshot(unit_price: i64, stock: i32) -> ProductSnapshot {
    ProductSnapshot {
        product_id: Uuid::new_v4(),
        name: format!("item-{unit_price}"),
        unit_price,
        stock,
    }
}

fn line(unit_price: i64, stock: i32, quantity: i32) -> CartLine {
    CartLine {
        product_id: Uuid::new_v4(),
        name: "line".into(),
        unit_price,
        stock,
        quantity,
    }
}

#[test]
fn subtotal_is_sum_of_line_totals() {
    let prices = [1_i64, 99, 1_250, 5_499, 100_000];
    let quantities = [1_i32, 2, 3, 7, 50];

    for take in 1..=prices.len() {
        let mut cart = Cart::new();
        let mut expected = 0_i64;
        for (price, qty) in prices.iter().zip(quantities.iter()).take(take) {
            let added = cart.add(snapshot(*price, 100), *qty).expect("in stock");
            assert_eq!(added, *qty);
            expected += price * i64::from(*qty);
        }
        assert_eq!(cart.subtotal().expect("no overflow"), expected);
        let by_line: i64 = cart
            .lines()
            .iter()
            .map(|l| l.line_total().expect("no overflow"))
            .sum();
        assert_eq!(by_line, expected);
    }
}

#[test]
fn empty_cart_has_zero_totals() {
    let cart = Cart::new();
    assert!(cart.is_empty());
    assert_eq!(cart.item_count(), 0);
    let totals = CheckoutTotals::for_cart(&cart, 16).expect("totals");
    assert_eq!(totals.subtotal, 0);
    assert_eq!(totals.tax, 0);
    assert_eq!(totals.total, 0);
}

#[test]
fn clamp_keeps_quantity_within_stock() {
    let id = Uuid::new_v4();
    for stock in 1..=12 {
        for requested in -3..=20 {
            let qty = clamp_quantity(id, requested, stock).expect("stock available");
            assert!((1..=stock).contains(&qty), "{requested} vs {stock} gave {qty}");
        }
    }
}

#[test]
fn out_of_stock_product_cannot_be_added() {
    let id = Uuid::new_v4();
    assert_eq!(clamp_quantity(id, 1, 0), Err(CartError::OutOfStock(id)));

    let mut cart = Cart::new();
    let product = snapshot(500, 0);
    let product_id = product.product_id;
    assert_eq!(cart.add(product, 1), Err(CartError::OutOfStock(product_id)));
    assert!(cart.is_empty());
}

#[test]
fn adding_same_product_merges_and_clamps() {
    let mut cart = Cart::new();
    let product = snapshot(300, 5);
    let id = product.product_id;

    assert_eq!(cart.add(product.clone(), 3), Ok(3));
    assert_eq!(cart.add(product.clone(), 4), Ok(5));
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.line(id).map(|l| l.quantity), Some(5));
    assert_eq!(cart.item_count(), 5);
}

#[test]
fn increment_and_decrement_stay_in_bounds() {
    let mut cart = Cart::new();
    let product = snapshot(100, 3);
    let id = product.product_id;
    cart.add(product, 1).expect("added");

    assert_eq!(cart.decrement(id), Ok(1));
    assert_eq!(cart.increment(id), Ok(2));
    assert_eq!(cart.increment(id), Ok(3));
    assert_eq!(cart.increment(id), Ok(3));
    assert_eq!(cart.set_quantity(id, 0), Ok(1));
    assert_eq!(cart.set_quantity(id, 99), Ok(3));
}

#[test]
fn missing_line_operations_fail() {
    let mut cart = Cart::new();
    let id = Uuid::new_v4();
    assert_eq!(cart.increment(id), Err(CartError::MissingLine(id)));
    assert_eq!(cart.set_quantity(id, 2), Err(CartError::MissingLine(id)));
    assert_eq!(cart.remove(id), Err(CartError::MissingLine(id)));
}

#[test]
fn remove_and_clear() {
    let mut cart = Cart::new();
    let a = snapshot(100, 10);
    let b = snapshot(200, 10);
    let a_id = a.product_id;
    cart.add(a, 2).expect("added");
    cart.add(b, 1).expect("added");

    let removed = cart.remove(a_id).expect("line present");
    assert_eq!(removed.quantity, 2);
    assert_eq!(cart.subtotal(), Ok(200));

    cart.clear();
    assert!(cart.is_empty());
}

#[test]
fn subtotal_overflow_is_reported() {
    let cart = Cart::from_lines(vec![line(i64::MAX, 10, 2)]);
    assert_eq!(cart.subtotal(), Err(CartError::Overflow));
}

#[test]
fn tax_rounds_half_up_and_discount_is_floored() {
    // 16% of 1_000 = 160
    let totals = CheckoutTotals::compute(1_000, 0, 16).expect("totals");
    assert_eq!((totals.tax, totals.total), (160, 1_160));

    // 16% of 3 = 0.48 -> 0, 16% of 4 = 0.64 -> 1
    assert_eq!(CheckoutTotals::compute(3, 0, 16).expect("totals").tax, 0);
    assert_eq!(CheckoutTotals::compute(4, 0, 16).expect("totals").tax, 1);
    // 10% of 5 = 0.5 -> 1
    assert_eq!(CheckoutTotals::compute(5, 0, 10).expect("totals").tax, 1);

    let negative = CheckoutTotals::compute(1_000, -50, 16).expect("totals");
    assert_eq!(negative.discount, 0);
    assert_eq!(negative.total, 1_160);

    let huge = CheckoutTotals::compute(1_000, 5_000, 16).expect("totals");
    assert_eq!(huge.total, 0);
}

#[test]
fn fulfillable_requires_lines_and_stock() {
    let err = ensure_fulfillable(&Cart::new()).expect_err("empty cart");
    assert!(matches!(err, AppError::BadRequest(_)));

    let short = Cart::from_lines(vec![line(100, 1, 2)]);
    let err = ensure_fulfillable(&short).expect_err("insufficient stock");
    assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("insufficient stock")));

    let ok = Cart::from_lines(vec![line(100, 2, 2), line(50, 9, 1)]);
    assert!(ensure_fulfillable(&ok).is_ok());
}

#[test]
fn final_statuses_are_locked() {
    use OrderStatus::*;

    for to in OrderStatus::ALL {
        assert!(validate_transition(Pending, to).is_ok());
        assert!(validate_transition(InProgress, to).is_ok());
    }
    assert!(validate_transition(Delivered, Delivered).is_ok());
    assert!(validate_transition(Delivered, Pending).is_err());
    assert!(validate_transition(Canceled, InProgress).is_err());
}

#[test]
fn enum_codes() {
    assert_eq!(DeliveryMethod::default().code(), 3);
    assert_eq!(DeliveryMethod::try_from(1).ok(), Some(DeliveryMethod::DriveThru));
    assert!(DeliveryMethod::try_from(4).is_err());

    assert_eq!(OrderStatus::parse("in_progress").ok(), Some(OrderStatus::InProgress));
    assert!(OrderStatus::parse("shipped").is_err());
    assert_eq!(PaymentType::parse("cash").ok(), Some(PaymentType::Cash));
    assert!(PaymentType::parse("paypal").is_err());
}

#[test]
fn average_rating_of_reviews() {
    let review = |rating| Review {
        id: Uuid::new_v4(),
        rating,
        comment: None,
        product_id: Uuid::nil(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    assert_eq!(average_rating(&[]), None);
    assert_eq!(average_rating(&[review(4), review(5), review(3)]), Some(4.0));
}

#[test]
fn pagination_is_clamped() {
    let default = Pagination::default().normalize();
    assert_eq!(default, (1, 20, 0));

    let p = Pagination {
        page: Some(0),
        per_page: Some(1_000),
    };
    assert_eq!(p.normalize(), (1, 100, 0));

    let p = Pagination {
        page: Some(3),
        per_page: Some(0),
    };
    assert_eq!(p.normalize(), (3, 1, 2));
}

#[test]
fn bill_number_format() {
    let seed = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").expect("uuid");
    let number = build_bill_number(seed);
    let parts: Vec<&str> = number.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "BILL");
    assert_eq!(parts[1].len(), 14);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2], "A1B2C3D4");
}

#[test]
fn order_history_url_encodes_the_email() {
    assert_eq!(
        order_history_url("ana@example.com").expect("url"),
        "/api/order-history?email=ana%40example.com"
    );
    assert_eq!(
        order_history_url("a+b&c=d#e%f@example.com").expect("url"),
        "/api/order-history?email=a%2Bb%26c%3Dd%23e%25f%40example.com"
    );
}
