//! Control-surface payload for one room.
//!
//! Only the content is decided here; layout and styling belong to the bridge.

use serde::Serialize;

use super::{action::ControlAction, entity::Room, value_object::ChannelId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelButton {
    pub custom_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlPanel {
    pub title: String,
    pub fields: Vec<PanelField>,
    /// 4 rows of 4 buttons.
    pub rows: Vec<Vec<PanelButton>>,
}

impl ControlPanel {
    pub fn build(channel: &ChannelId, channel_name: &str, room: &Room) -> Self {
        let field = |name: &str, value: String| PanelField {
            name: name.to_string(),
            value,
        };
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" }.to_string();

        let rows = ControlAction::ALL
            .chunks(4)
            .map(|row| {
                row.iter()
                    .map(|action| PanelButton {
                        custom_id: action.custom_id(channel),
                        label: action.label().to_string(),
                    })
                    .collect()
            })
            .collect();

        Self {
            title: format!("🔶 TempVoice — {channel_name}"),
            fields: vec![
                field("Owner", room.owner.mention()),
                field("Limit", room.user_limit.to_string()),
                field("Locked", yes_no(room.locked)),
                field("Private", yes_no(room.private)),
            ],
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, UserId, UserLimit};

    #[test]
    fn test_panel_is_a_four_by_four_grid_addressing_the_room() {
        // テスト項目: パネルは 4×4 のボタンを持ち、全てルームのチャンネルを指す
        // given (前提条件):
        let channel = ChannelId::new("777").unwrap();
        let room = Room::new(
            UserId::new("42").unwrap(),
            "alice's Room",
            UserLimit::clamped(5),
            Timestamp::new(0),
        );

        // when (操作):
        let panel = ControlPanel::build(&channel, "alice's Room", &room);

        // then (期待する結果):
        assert_eq!(panel.rows.len(), 4);
        assert!(panel.rows.iter().all(|row| row.len() == 4));
        assert!(
            panel
                .rows
                .iter()
                .flatten()
                .all(|button| button.custom_id.ends_with("_777"))
        );
        assert_eq!(panel.fields[0].value, "<@42>");
        assert_eq!(panel.fields[1].value, "5");
        assert!(panel.title.contains("alice's Room"));
    }
}
