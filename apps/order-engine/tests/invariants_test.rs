//! Property tests for the financial invariants.

use proptest::prelude::*;

use order_engine::domain::ordering::aggregate::{CreateOrderCommand, LineItem, Order};
use order_engine::domain::payment::aggregate::Payment;
use order_engine::domain::payment::value_objects::PaymentStatus;
use order_engine::domain::shared::{
    Currency, CustomerId, EventId, GatewayRef, MenuItemId, Money, OrderId, RestaurantId, TenantId,
};
use rust_decimal::Decimal;

fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    // Quantities 1..=20, prices 0.01..=500.00 in cents.
    (1u32..=20, 1i64..=50_000).prop_map(|(quantity, cents)| {
        LineItem::new(
            MenuItemId::generate(),
            quantity,
            Money::from_cents(cents),
        )
        .expect("positive quantity and price")
    })
}

proptest! {
    /// The order total always equals the sum of quantity x unit price.
    #[test]
    fn order_total_is_sum_of_line_items(items in prop::collection::vec(line_item_strategy(), 1..8)) {
        let expected: Decimal = items
            .iter()
            .map(|item| item.unit_price().amount() * Decimal::from(item.quantity()))
            .sum();

        let order = Order::new(CreateOrderCommand {
            customer_id: CustomerId::new("cust-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: items,
            declared_total: None,
        })
        .unwrap();

        prop_assert_eq!(order.total().amount(), expected);
    }

    /// Replaying any sequence of gateway events is idempotent: a second
    /// identical application never changes the outcome.
    #[test]
    fn payment_event_application_is_idempotent(
        outcomes in prop::collection::vec(prop::bool::ANY, 1..6)
    ) {
        let mut payment = Payment::new(
            OrderId::new("ord-1"),
            Money::from_cents(1500),
            Currency::Usd,
            GatewayRef::new("pi_1"),
        )
        .unwrap();

        for (i, succeeded) in outcomes.iter().enumerate() {
            let status = if *succeeded {
                PaymentStatus::Succeeded
            } else {
                PaymentStatus::Failed
            };
            payment.apply_event(EventId::new(format!("evt-{i}")), status);
        }
        let first_pass = payment.clone();

        for (i, succeeded) in outcomes.iter().enumerate() {
            let status = if *succeeded {
                PaymentStatus::Succeeded
            } else {
                PaymentStatus::Failed
            };
            payment.apply_event(EventId::new(format!("evt-{i}")), status);
        }

        prop_assert_eq!(payment.status(), first_pass.status());
        prop_assert_eq!(
            payment.processed_events().len(),
            first_pass.processed_events().len()
        );

        // The first terminal outcome decides the payment for good.
        let expected = if outcomes[0] {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::Failed
        };
        prop_assert_eq!(payment.status(), expected);
    }
}
