use super::types::MeetupEvent;

/// Display cap for the digest. The header still reports the full count.
pub const DISPLAY_LIMIT: usize = 10;

/// Renders an ordered event list into a bounded, human-readable digest.
/// Used both as direct tool output and as context injected into a
/// downstream prompt. Total function: never fails, byte-identical output
/// for identical ordered input.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFormatter;

impl EventFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, events: &[MeetupEvent]) -> String {
        if events.is_empty() {
            return "No events found matching your criteria.".to_string();
        }

        let mut parts = vec![format!("Found {} relevant events:", events.len())];

        for (index, event) in events.iter().take(DISPLAY_LIMIT).enumerate() {
            let mut info = vec![
                format!("**{}**", event.title),
                format!("  - Group: {}", event.group_name),
                format!("  - Date: {}", event.start_time.format("%Y-%m-%d %H:%M")),
            ];

            // Online status takes precedence over any venue fields.
            if event.is_online {
                info.push("  - Location: Online/Remote".to_string());
            } else if let Some(venue_name) = &event.venue_name {
                let mut location = venue_name.clone();
                if let Some(venue_city) = &event.venue_city {
                    location.push_str(", ");
                    location.push_str(venue_city);
                }
                info.push(format!("  - Location: {}", location));
            }

            if event.attendee_count > 0 {
                info.push(format!("  - Attendees: {}", event.attendee_count));
            }

            match event.fee_amount {
                Some(amount) if amount != 0.0 => {
                    let currency = event.fee_currency.as_deref().unwrap_or("USD");
                    info.push(format!("  - Fee: {} {}", format_amount(amount), currency));
                }
                _ => info.push("  - Fee: Free".to_string()),
            }

            info.push(format!("  - URL: {}", event.url));
            parts.push(format!("\n{}. {}", index + 1, info.join("\n")));
        }

        if events.len() > DISPLAY_LIMIT {
            parts.push(format!(
                "\n...and {} more events not shown.",
                events.len() - DISPLAY_LIMIT
            ));
        }

        parts.join("\n")
    }

    /// Appends the event digest to a user prompt under a fixed section
    /// header, ready to hand to a language model.
    pub fn augment_prompt(&self, prompt: &str, events: &[MeetupEvent]) -> String {
        if events.is_empty() {
            return format!("{}\n\n[Note: No relevant Meetup events found.]", prompt);
        }

        format!(
            "{}\n\n=== Relevant Meetup Events ===\n{}\n\nPlease provide recommendations based on the above events.",
            prompt,
            self.format(events)
        )
    }
}

/// Whole amounts keep one decimal place ("15.0 USD"), fractional amounts
/// render as-is ("12.5 EUR").
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.1}", amount)
    } else {
        amount.to_string()
    }
}
