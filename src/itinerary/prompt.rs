use crate::models::trip::Budget;

const RESPONSE_SCHEMA: &str = r#"{
  "destination": "string",
  "duration": number,
  "totalEstimatedCost": "string",
  "itinerary": [
    {
      "day": number,
      "activities": {
        "morning": "string",
        "afternoon": "string",
        "evening": "string"
      },
      "estimatedCost": "string",
      "accommodation": "string"
    }
  ],
  "transportationTips": "string",
  "additionalRecommendations": "string"
}"#;

const NO_PREFERENCES: &str =
    "No specific preferences provided - create a balanced itinerary with popular activities.";

/// Builds the single prompt sent to the model. Pure function of its inputs.
pub fn build_prompt(destination: &str, duration: u32, details: &str) -> String {
    let mut prompt = format!(
        "You are TripSage, an AI travel assistant. Create a detailed {duration}-day itinerary for {destination}."
    );

    prompt.push_str("\n\nThe itinerary should include:");
    prompt.push_str("\n1. Daily schedule with morning, afternoon, and evening activities");
    prompt.push_str("\n2. Key attractions to visit");
    prompt.push_str("\n3. Food and dining suggestions");
    prompt.push_str("\n4. Estimated costs for each day");
    prompt.push_str("\n5. Accommodation suggestions");
    prompt.push_str("\n6. Transportation tips between locations");
    prompt.push_str("\n7. Additional tips or recommendations");
    prompt.push_str("\n8. Total estimated cost of the trip");

    let details = details.trim();
    if details.is_empty() {
        prompt.push_str(&format!("\n\n{NO_PREFERENCES}"));
    } else {
        prompt.push_str(&format!("\n\nUser preferences: {details}"));
    }

    prompt.push_str(&format!(
        "\n\nRespond with ONLY a valid JSON object, without markdown formatting or any text \
         before or after it, using exactly this structure:\n{RESPONSE_SCHEMA}\n\
         The \"itinerary\" array must contain one entry per day, {duration} in total."
    ));

    prompt
}

/// Folds budget and interests into the free-text details sent to the model.
pub fn enrich_details(details: &str, budget: Option<Budget>, interests: &[String]) -> String {
    let mut enriched = details.trim().to_string();
    if let Some(budget) = budget {
        append_sentence(&mut enriched, &format!("Budget preference: {budget}."));
    }
    if !interests.is_empty() {
        append_sentence(&mut enriched, &format!("Interests: {}.", interests.join(", ")));
    }
    enriched
}

fn append_sentence(target: &mut String, sentence: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(sentence);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_states_duration_and_destination() {
        let prompt = build_prompt("Bali", 5, "");
        assert!(prompt.contains("5-day itinerary for Bali"));
        assert!(prompt.contains("morning, afternoon, and evening"));
        assert!(prompt.contains("\"totalEstimatedCost\""));
        assert!(prompt.contains("Respond with ONLY a valid JSON object"));
    }

    #[test]
    fn empty_details_ask_for_balanced_itinerary() {
        let prompt = build_prompt("Oslo", 2, "   ");
        assert!(prompt.contains(NO_PREFERENCES));
        assert!(!prompt.contains("User preferences:"));
    }

    #[test]
    fn details_are_embedded_verbatim() {
        let prompt = build_prompt("Oslo", 2, "Vegetarian food, no museums");
        assert!(prompt.contains("User preferences: Vegetarian food, no museums"));
        assert!(!prompt.contains(NO_PREFERENCES));
    }

    #[test]
    fn enrich_appends_budget_and_interests() {
        let interests = vec!["food".to_string(), "beaches".to_string()];
        let enriched = enrich_details("Travelling with kids.", Some(Budget::Luxury), &interests);
        assert_eq!(
            enriched,
            "Travelling with kids. Budget preference: luxury. Interests: food, beaches."
        );
    }

    #[test]
    fn enrich_without_extras_keeps_details() {
        assert_eq!(enrich_details("", None, &[]), "");
        assert_eq!(
            enrich_details("", Some(Budget::Budget), &[]),
            "Budget preference: budget."
        );
    }
}
