//! Command listing rendered as a flex carousel.

use crate::bot::message::OutboundMessage;
use crate::bot::registry::{Command, CommandRegistry};
use serde_json::{json, Value};

/// Notification text of the listing.
pub const HELP_ALT_TEXT: &str = "コマンド一覧";

const HEADER_COLOR: &str = "#27ACB2";
const DETAILS_COLOR: &str = "#8C8C8C";

/// Render one bubble per registered command, in registration order.
///
/// Tapping a bubble's header posts back the bare command name.
#[must_use]
pub fn render_help(registry: &CommandRegistry) -> OutboundMessage {
    let bubbles = registry.iter().map(render_bubble).collect();
    OutboundMessage::carousel(HELP_ALT_TEXT, bubbles)
}

fn render_bubble(command: &Command) -> Value {
    // Flex text components reject empty strings
    let details = match command.details() {
        d if d.is_empty() => command.title(),
        d => d,
    };

    json!({
        "type": "bubble",
        "size": "kilo",
        "header": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {
                    "type": "text",
                    "text": command.title(),
                    "color": "#ffffff",
                    "align": "start",
                    "size": "md",
                    "gravity": "center"
                }
            ],
            "backgroundColor": HEADER_COLOR,
            "paddingAll": "15px",
            "action": {
                "type": "postback",
                "label": command.name(),
                "data": command.name(),
                "displayText": command.name()
            }
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {
                    "type": "box",
                    "layout": "horizontal",
                    "contents": [
                        {
                            "type": "text",
                            "text": details,
                            "color": DETAILS_COLOR,
                            "size": "sm",
                            "wrap": true
                        }
                    ],
                    "flex": 1
                }
            ],
            "spacing": "md",
            "paddingAll": "12px"
        },
        "styles": {
            "footer": {
                "separator": false
            }
        }
    })
}
