//! Checkout: order summary and the three-step form

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};
use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::domain::validation::{invalid, required, FieldErrors};
use crate::domain::value_objects::Money;

/// Flat delivery fee in FCFA.
pub const DEFAULT_SHIPPING_COST: u64 = 5000;

/// Totals shown at checkout. Owned copy of the cart at assembly time; later
/// cart edits require assembling a new summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub items: Vec<CartLine>,
    pub total_items: u64,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl OrderSummary {
    pub fn assemble(cart: &Cart, shipping_cost: u64) -> Self {
        let totals = cart.totals();
        let currency = cart.currency();
        Self {
            items: cart.items().to_vec(),
            total_items: totals.total_items,
            total: Money::new(totals.total_price.amount().saturating_add(shipping_cost), currency),
            subtotal: totals.total_price,
            shipping: Money::new(shipping_cost, currency),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    #[default]
    Contact,
    Address,
    Payment,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 3] = [Self::Contact, Self::Address, Self::Payment];

    pub fn as_str(self) -> &'static str {
        match self { Self::Contact => "contact", Self::Address => "address", Self::Payment => "payment" }
    }

    pub fn next(self) -> Self {
        match self { Self::Contact => Self::Address, Self::Address | Self::Payment => Self::Payment }
    }

    pub fn previous(self) -> Self {
        match self { Self::Contact | Self::Address => Self::Contact, Self::Payment => Self::Address }
    }

    /// Checks only the fields this step collects.
    pub fn validate(self, form: &CheckoutForm) -> Result<(), FieldErrors> {
        let result = match self {
            Self::Contact => form.contact.validate(),
            Self::Address => form.address.validate(),
            Self::Payment => form.payment.validate(),
        };
        result.map_err(FieldErrors::from)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactDetails {
    #[validate(custom = "required")]
    pub first_name: String,
    #[validate(custom = "required")]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom = "phone_number")]
    pub phone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(custom = "required")]
    pub address: String,
    #[validate(custom = "required")]
    pub city: String,
    pub postal_code: Option<String>,
    #[validate(custom = "required")]
    pub country: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentDetails {
    #[serde(rename_all = "camelCase")]
    Card { card_number: String, expiry_date: String, cvv: String, card_name: String },
    #[serde(rename_all = "camelCase")]
    Mobile { mobile_number: String },
}

impl Default for PaymentDetails {
    fn default() -> Self {
        Self::Card { card_number: String::new(), expiry_date: String::new(), cvv: String::new(), card_name: String::new() }
    }
}

impl PaymentDetails {
    pub fn method(&self) -> &'static str {
        match self { Self::Card { .. } => "card", Self::Mobile { .. } => "mobile" }
    }
}

impl Validate for PaymentDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match self {
            Self::Card { card_number, expiry_date, cvv, card_name } => {
                if let Err(e) = card_digits(card_number) { errors.add("card_number", e); }
                if let Err(e) = expiry(expiry_date) { errors.add("expiry_date", e); }
                if let Err(e) = security_code(cvv) { errors.add("cvv", e); }
                if let Err(e) = required(card_name) { errors.add("card_name", e); }
            }
            Self::Mobile { mobile_number } => {
                if let Err(e) = phone_number(mobile_number) { errors.add("mobile_number", e); }
            }
        }
        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutForm {
    pub contact: ContactDetails,
    pub address: ShippingAddress,
    pub payment: PaymentDetails,
    pub notes: Option<String>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("{} step is incomplete: {errors}", step.as_str())]
    Incomplete { step: CheckoutStep, errors: FieldErrors },
}

/// Everything the order desk needs once all three steps pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSubmission {
    pub form: CheckoutForm,
    pub summary: OrderSummary,
}

/// Linear Contact → Address → Payment progression. Moving forward requires
/// the current step to validate; moving back never does.
#[derive(Clone, Debug, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    form: CheckoutForm,
}

impl CheckoutFlow {
    pub fn new() -> Self { Self::default() }
    pub fn with_form(form: CheckoutForm) -> Self { Self { step: CheckoutStep::Contact, form } }

    pub fn step(&self) -> CheckoutStep { self.step }
    pub fn form(&self) -> &CheckoutForm { &self.form }
    pub fn form_mut(&mut self) -> &mut CheckoutForm { &mut self.form }

    pub fn advance(&mut self) -> Result<CheckoutStep, FieldErrors> {
        self.step.validate(&self.form)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn back(&mut self) -> CheckoutStep {
        self.step = self.step.previous();
        self.step
    }

    /// Validates every step against the current form and freezes the cart
    /// into a summary. Does not touch the cart.
    pub fn submit(&self, cart: &Cart, shipping_cost: u64) -> Result<CheckoutSubmission, CheckoutError> {
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        for step in CheckoutStep::ALL {
            step.validate(&self.form).map_err(|errors| CheckoutError::Incomplete { step, errors })?;
        }
        Ok(CheckoutSubmission { form: self.form.clone(), summary: OrderSummary::assemble(cart, shipping_cost) })
    }
}

/// Digits with the usual separators, 7 to 15 digits (E.164 upper bound).
/// Longer input is rejected rather than cut down.
pub fn phone_number(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body.chars().all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')')) {
        return Err(invalid("phone", "Phone number may only contain digits"));
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(invalid("phone", "Phone number must have between 7 and 15 digits"));
    }
    Ok(())
}

fn card_digits(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let digits: String = value.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(12..=19).contains(&digits.len()) {
        return Err(invalid("card_number", "Invalid card number"));
    }
    Ok(())
}

fn expiry(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let valid = match value.trim().split_once('/') {
        Some((mm, yy)) if mm.len() == 2 && yy.len() == 2 && yy.chars().all(|c| c.is_ascii_digit()) => {
            matches!(mm.parse::<u8>(), Ok(1..=12))
        }
        _ => false,
    };
    if !valid { return Err(invalid("expiry", "Expiry date must be MM/YY")); }
    Ok(())
}

fn security_code(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    let v = value.trim();
    if !(3..=4).contains(&v.len()) || !v.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("cvv", "Invalid security code"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::CartLineInput;

    fn cart_with(price: u64, qty: i64) -> Cart {
        let mut cart = Cart::new("XOF");
        cart.add_item(CartLineInput { id: "w1".into(), name: "Lace Front".into(), price, image: "i".into(), color: None, length: None }).unwrap();
        cart.update_quantity("w1", qty).unwrap();
        cart
    }

    fn complete_form() -> CheckoutForm {
        CheckoutForm {
            contact: ContactDetails {
                first_name: "Awa".into(), last_name: "Diallo".into(),
                email: "awa@example.com".into(), phone: "+221 77 123 45 67".into(),
            },
            address: ShippingAddress {
                address: "12 rue Carnot".into(), city: "Dakar".into(), postal_code: None, country: "Sénégal".into(),
            },
            payment: PaymentDetails::Mobile { mobile_number: "771234567".into() },
            notes: None,
        }
    }

    #[test]
    fn test_summary_adds_shipping() {
        let cart = cart_with(1000, 5);
        let summary = OrderSummary::assemble(&cart, DEFAULT_SHIPPING_COST);
        assert_eq!(summary.subtotal.amount(), 5000);
        assert_eq!(summary.shipping.amount(), 5000);
        assert_eq!(summary.total.amount(), 10_000);
        assert_eq!(summary.total_items, 5);
    }

    #[test]
    fn test_summary_is_a_snapshot() {
        let mut cart = cart_with(1000, 5);
        let summary = OrderSummary::assemble(&cart, 700);
        cart.update_quantity("w1", 1).unwrap();
        cart.clear();
        assert_eq!(summary.total.amount(), 5700);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(OrderSummary::assemble(&cart, 700).total.amount(), 700);
    }

    #[test]
    fn test_contact_step_blocks_on_missing_fields() {
        let mut flow = CheckoutFlow::new();
        flow.form_mut().contact.first_name = "Awa".into();
        let errors = flow.advance().unwrap_err();
        assert_eq!(flow.step(), CheckoutStep::Contact);
        assert!(errors.contains("lastName"));
        assert!(errors.contains("email"));
        assert!(errors.contains("phone"));
        assert!(!errors.contains("firstName"));
    }

    #[test]
    fn test_walk_forward_and_back() {
        let mut flow = CheckoutFlow::with_form(complete_form());
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Address);
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Payment);
        assert_eq!(flow.back(), CheckoutStep::Address);
        assert_eq!(flow.back(), CheckoutStep::Contact);
        assert_eq!(flow.back(), CheckoutStep::Contact);
    }

    #[test]
    fn test_back_is_unconditional() {
        let mut flow = CheckoutFlow::with_form(complete_form());
        flow.advance().unwrap();
        flow.form_mut().contact = ContactDetails::default();
        flow.form_mut().address = ShippingAddress::default();
        assert_eq!(flow.back(), CheckoutStep::Contact);
    }

    #[test]
    fn test_address_step_requires_city_and_country() {
        let mut form = complete_form();
        form.address.city = "  ".into();
        form.address.country.clear();
        let errors = CheckoutStep::Address.validate(&form).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("city"), Some("This field is required"));
    }

    #[test]
    fn test_phone_is_validated_not_clamped() {
        assert!(phone_number("+33 6 12 34 56 78").is_ok());
        assert!(phone_number("(221) 77-123-4567").is_ok());
        assert!(phone_number("123").is_err());
        assert!(phone_number("1234567890123456").is_err());
        assert!(phone_number("77 12 ab 45").is_err());
    }

    #[test]
    fn test_card_payment_rules() {
        let card = PaymentDetails::Card {
            card_number: "4242 4242 4242 4242".into(), expiry_date: "09/27".into(),
            cvv: "123".into(), card_name: "AWA DIALLO".into(),
        };
        assert!(card.validate().is_ok());
        let bad = PaymentDetails::Card {
            card_number: "4242".into(), expiry_date: "13/27".into(), cvv: "12a".into(), card_name: "".into(),
        };
        let errors = FieldErrors::from(bad.validate().unwrap_err());
        for field in ["cardNumber", "expiryDate", "cvv", "cardName"] { assert!(errors.contains(field), "{field}"); }
    }

    #[test]
    fn test_payment_method_json_shape() {
        let json = serde_json::json!({"method": "mobile", "mobileNumber": "771234567"});
        let payment: PaymentDetails = serde_json::from_value(json).unwrap();
        assert_eq!(payment.method(), "mobile");
    }

    #[test]
    fn test_submit_requires_items_and_all_steps() {
        let empty = Cart::new("XOF");
        let flow = CheckoutFlow::with_form(complete_form());
        assert!(matches!(flow.submit(&empty, 5000), Err(CheckoutError::EmptyCart)));

        let mut incomplete = complete_form();
        incomplete.payment = PaymentDetails::default();
        let err = CheckoutFlow::with_form(incomplete).submit(&cart_with(10, 1), 5000).unwrap_err();
        assert!(matches!(err, CheckoutError::Incomplete { step: CheckoutStep::Payment, .. }));

        let submission = flow.submit(&cart_with(5000, 1), 5000).unwrap();
        assert_eq!(submission.summary.total.amount(), 10_000);
    }
}
