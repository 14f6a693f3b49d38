use super::checkout::ShippingAddress;
use super::errors::CheckoutError;

/// Structural pre-flight check on the shipping address, run before any store
/// round-trip. Presence only: no phone or postal code format rules. Fails on
/// the first missing field.
pub fn validate_shipping_address(address: &ShippingAddress) -> Result<(), CheckoutError> {
    let required: [(&'static str, &str); 5] = [
        ("full_name", &address.full_name),
        ("phone", &address.phone),
        ("address_line1", &address.address_line1),
        ("city", &address.city),
        ("province", &address.province),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(CheckoutError::ValidationFailed { field });
        }
    }

    Ok(())
}
