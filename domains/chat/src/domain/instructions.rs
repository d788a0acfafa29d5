//! Additional run instructions
//!
//! Each turn's run carries free-text instructions composed from the visitor's
//! profile (one sentence per known field) and exactly one product-focus
//! sentence.

use super::entities::{Product, UserProfile};

const PRODUCT_FOCUS: &str = "The user is asking about a specific product. Keep the answer focused on that product, its benefits and how to get started with it.";

const GENERAL_FOCUS: &str = "The user has not picked a product yet. Answer their question and, when it fits, recommend the offer that best matches their situation.";

/// Compose the additional instructions for one run
pub fn compose_instructions(profile: Option<&UserProfile>, product: Option<Product>) -> String {
    let mut fragments: Vec<String> = Vec::new();

    if let Some(profile) = profile {
        if let Some(first_name) = profile.first_name() {
            fragments.push(format!(
                "The user's first name is {}. Address them by their first name.",
                first_name
            ));
        }
        if let Some(last_name) = profile.last_name() {
            fragments.push(format!("Their last name is {}.", last_name));
        }
        if let Some(email) = profile.email() {
            fragments.push(format!(
                "Their email address is {}, so do not ask for it again.",
                email
            ));
        }
        if let Some(phone) = profile.phone() {
            fragments.push(format!("Their phone number is {}.", phone));
        }
    }

    fragments.push(
        match product {
            Some(_) => PRODUCT_FOCUS,
            None => GENERAL_FOCUS,
        }
        .to_string(),
    );

    fragments.join(" ")
}
