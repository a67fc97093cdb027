//! Business arithmetic shared by the invoice and ledger queries.

/// Amount with the sale-type sign applied; credit notes carry `sign = -1`
pub fn signed(amount: f64, sign: f64) -> f64 {
    amount * sign
}

/// Net amount after a percentage discount
pub fn discount_net(unit_net: f64, discount_pct: f64) -> f64 {
    unit_net - discount_pct * unit_net / 100.0
}

/// Unit price weighted by quantity; 0 when nothing was sold
pub fn weighted_unit_price(amount: f64, quantity: f64) -> f64 {
    if quantity == 0.0 {
        0.0
    } else {
        amount / quantity
    }
}

/// Split a ledger amount into `(debe, haber)` by the movement code sign
pub fn debit_credit(sign: i64, amount: f64) -> (f64, f64) {
    match sign {
        1 => (amount, 0.0),
        -1 => (0.0, amount),
        _ => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_net() {
        assert_eq!(discount_net(100.0, 10.0), 90.0);
        assert_eq!(discount_net(250.0, 0.0), 250.0);
        assert!((discount_net(80.0, 12.5) - 80.0 * (1.0 - 0.125)).abs() < 1e-9);
    }

    #[test]
    fn test_signed_credit_note() {
        assert_eq!(signed(1500.0, -1.0), -1500.0);
        assert_eq!(signed(1500.0, 1.0), 1500.0);
    }

    #[test]
    fn test_weighted_unit_price() {
        assert_eq!(weighted_unit_price(300.0, 4.0), 75.0);
        assert_eq!(weighted_unit_price(300.0, 0.0), 0.0);
    }

    #[test]
    fn test_debit_credit() {
        assert_eq!(debit_credit(1, 42.0), (42.0, 0.0));
        assert_eq!(debit_credit(-1, 42.0), (0.0, 42.0));
        assert_eq!(debit_credit(0, 42.0), (0.0, 0.0));
    }
}
