//! Prompts for the routine assistant

use crate::error::Result;
use crate::selection::SelectionSet;
use serde::Serialize;

/// Default system prompt framing the assistant as a routine advisor
pub const SYSTEM_PROMPT: &str = "You are a friendly beauty and skincare advisor. \
Help the user build a personalized routine using the products they selected. \
Explain the order of application, when to use each product (morning or evening), \
and why it fits. Only answer questions about the routine, skincare, haircare, \
makeup, fragrance, and related topics. Politely decline anything unrelated.";

/// Subset of product fields sent to the model
#[derive(Serialize)]
struct RoutineProduct<'a> {
    name: &'a str,
    brand: &'a str,
    category: &'a str,
    description: &'a str,
}

/// Build the user message asking for a routine from `selection`
///
/// # Errors
///
/// Returns an error if the product list cannot be serialized
pub fn routine_request(selection: &SelectionSet) -> Result<String> {
    let products: Vec<RoutineProduct<'_>> = selection
        .iter()
        .map(|p| RoutineProduct {
            name: &p.name,
            brand: &p.brand,
            category: &p.category,
            description: &p.description,
        })
        .collect();

    let json = serde_json::to_string_pretty(&products)?;
    Ok(format!(
        "Please create a step-by-step routine using only these selected products:\n\n{}",
        json
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_products;

    #[test]
    fn test_routine_request_embeds_products_as_json() {
        let selection = SelectionSet::from_products(sample_products().into_iter().take(2));
        let request = routine_request(&selection).unwrap();

        let json_start = request.find('[').unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&request[json_start..]).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Foaming Facial Cleanser");
        assert!(items[0].get("image").is_none());
        assert!(items[0].get("id").is_none());
    }
}
