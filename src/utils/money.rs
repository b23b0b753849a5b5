// Utilitários para manipulação de valores monetários.
// Checkout payloads carry decimal currency units; sums are done in integer cents.

pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Like [`to_cents`], but `None` when the value is not finite or does not fit in `i64`.
pub fn try_to_cents(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64)
        .then_some(cents as i64)
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Sum of `price × quantity` over the cart plus the shipping fee, in cents.
/// `None` when any step overflows.
pub fn cart_total_cents<I>(items: I, shipping_fee: f64) -> Option<i64>
where
    I: IntoIterator<Item = (f64, u32)>,
{
    let items_total = items.into_iter().try_fold(0i64, |acc, (price, quantity)| {
        try_to_cents(price)?
            .checked_mul(i64::from(quantity))
            .and_then(|line| acc.checked_add(line))
    })?;

    items_total.checked_add(try_to_cents(shipping_fee)?)
}

pub fn format_currency(cents: i64) -> String {
    format!("R$ {:.2}", from_cents(cents))
}
