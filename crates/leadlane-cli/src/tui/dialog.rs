//! Modal create/edit form for a lead.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use leadlane_core::error::SyncError;
use leadlane_core::model::{EmptyField, Lead, LeadId, LeadPatch, NewLead, Vehicle};
use leadlane_core::remote::VehicleCatalog;

/// Field focus order inside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Phone,
    Vehicle,
    Comment,
}

impl Field {
    const fn next(self) -> Self {
        match self {
            Self::Name => Self::Phone,
            Self::Phone => Self::Vehicle,
            Self::Vehicle => Self::Comment,
            Self::Comment => Self::Name,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Name => Self::Comment,
            Self::Phone => Self::Name,
            Self::Vehicle => Self::Phone,
            Self::Comment => Self::Vehicle,
        }
    }
}

/// What a key press did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Cancel,
    Submit,
}

/// Create/edit form state. The vehicle field is a catalog selector, not
/// free text — creation must reference a catalog entry.
pub struct LeadForm {
    target: Option<LeadId>,
    pub name: String,
    pub phone: String,
    pub vehicles: Vec<Vehicle>,
    pub vehicle_idx: usize,
    pub comment: String,
    pub focus: Field,
    pub error: Option<String>,
}

impl LeadForm {
    /// Empty form backed by the current catalog.
    pub fn create(catalog: &dyn VehicleCatalog) -> Result<Self, SyncError> {
        let vehicles = catalog.list().map_err(SyncError::from)?;
        Ok(Self {
            target: None,
            name: String::new(),
            phone: String::new(),
            vehicles,
            vehicle_idx: 0,
            comment: String::new(),
            focus: Field::Name,
            error: None,
        })
    }

    /// Form pre-filled from an existing lead. A vehicle no longer in the
    /// catalog is kept selectable so stale references stay editable.
    pub fn edit(catalog: &dyn VehicleCatalog, lead: &Lead) -> Result<Self, SyncError> {
        let mut vehicles = catalog.list().map_err(SyncError::from)?;
        let vehicle_idx = match vehicles
            .iter()
            .position(|vehicle| vehicle.name == lead.vehicle_interest)
        {
            Some(idx) => idx,
            None => {
                vehicles.push(Vehicle {
                    id: String::new(),
                    name: lead.vehicle_interest.clone(),
                });
                vehicles.len() - 1
            }
        };
        Ok(Self {
            target: Some(lead.id.clone()),
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            vehicles,
            vehicle_idx,
            comment: lead.comment.clone().unwrap_or_default(),
            focus: Field::Name,
            error: None,
        })
    }

    /// The lead being edited, or `None` for a create form.
    #[must_use]
    pub const fn target(&self) -> Option<&LeadId> {
        self.target.as_ref()
    }

    fn vehicle_name(&self) -> Option<&str> {
        self.vehicles.get(self.vehicle_idx).map(|v| v.name.as_str())
    }

    fn validate(&self) -> Result<(), EmptyField> {
        if self.name.trim().is_empty() {
            return Err(EmptyField { field: "nombre" });
        }
        if self.phone.trim().is_empty() {
            return Err(EmptyField { field: "telefono" });
        }
        if self.vehicle_name().is_none() {
            return Err(EmptyField {
                field: "vehiculo_interes",
            });
        }
        Ok(())
    }

    /// Consume the form as a creation draft.
    pub fn into_new_lead(self) -> Result<NewLead, SyncError> {
        self.validate()?;
        let vehicle = self.vehicle_name().unwrap_or_default().to_string();
        let comment = if self.comment.trim().is_empty() {
            None
        } else {
            Some(self.comment.clone())
        };
        Ok(NewLead {
            name: self.name,
            phone: self.phone,
            vehicle_interest: vehicle,
            comment,
        })
    }

    /// Consume the form as a full edit patch. An emptied comment clears
    /// the stored one.
    pub fn into_patch(self) -> Result<LeadPatch, SyncError> {
        self.validate()?;
        let vehicle = self.vehicle_name().unwrap_or_default().to_string();
        let comment = if self.comment.trim().is_empty() {
            Some(None)
        } else {
            Some(Some(self.comment.clone()))
        };
        Ok(LeadPatch {
            name: Some(self.name),
            phone: Some(self.phone),
            vehicle_interest: Some(vehicle),
            comment,
            status: None,
        })
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Name => Some(&mut self.name),
            Field::Phone => Some(&mut self.phone),
            Field::Comment => Some(&mut self.comment),
            Field::Vehicle => None,
        }
    }
}

/// Apply one key press to the form.
pub fn handle_key(form: &mut LeadForm, key: KeyEvent) -> FormAction {
    match key.code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter => {
            if let Err(err) = form.validate() {
                form.error = Some(err.to_string());
                return FormAction::Continue;
            }
            return FormAction::Submit;
        }
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
        KeyCode::Left if form.focus == Field::Vehicle => {
            form.vehicle_idx = form.vehicle_idx.saturating_sub(1);
        }
        KeyCode::Right if form.focus == Field::Vehicle => {
            if !form.vehicles.is_empty() {
                form.vehicle_idx = (form.vehicle_idx + 1).min(form.vehicles.len() - 1);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = form.field_mut() {
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = form.field_mut() {
                field.push(c);
            }
        }
        _ => {}
    }
    FormAction::Continue
}

/// Centered popup rect of at most `width` x `height`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render(frame: &mut Frame<'_>, form: &LeadForm) {
    let area = centered(frame.area(), 52, 12);
    frame.render_widget(Clear, area);

    let title = if form.target.is_some() {
        " Editar Lead "
    } else {
        " Crear Nuevo Lead "
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let field_line = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<11}"), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), style),
            Span::raw(if focused { "▏" } else { "" }),
        ])
    };

    let vehicle = form
        .vehicles
        .get(form.vehicle_idx)
        .map_or("(catálogo vacío)", |v| v.name.as_str());
    let mut lines = vec![
        field_line("Nombre", &form.name, form.focus == Field::Name),
        field_line("Teléfono", &form.phone, form.focus == Field::Phone),
        field_line(
            "Vehículo",
            &format!("< {vehicle} >"),
            form.focus == Field::Vehicle,
        ),
        field_line("Comentario", &form.comment, form.focus == Field::Comment),
        Line::raw(""),
        Line::styled(
            "Enter guardar · Esc cancelar · Tab campo · ←/→ vehículo",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    use leadlane_core::remote::RemoteError;

    struct FixedCatalog;

    impl VehicleCatalog for FixedCatalog {
        fn list(&self) -> Result<Vec<Vehicle>, RemoteError> {
            Ok(vec![
                Vehicle {
                    id: "veh-001".to_string(),
                    name: "Geely".to_string(),
                },
                Vehicle {
                    id: "veh-002".to_string(),
                    name: "Mustang".to_string(),
                },
            ])
        }

        fn add(&self, _name: &str) -> Result<Vehicle, RemoteError> {
            Err(RemoteError::Rejected {
                reason: "read-only".to_string(),
            })
        }

        fn remove(&self, _id: &str) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn typing_fills_the_focused_field() {
        let mut form = LeadForm::create(&FixedCatalog).expect("form");
        for c in "Ana".chars() {
            handle_key(&mut form, press(KeyCode::Char(c)));
        }
        handle_key(&mut form, press(KeyCode::Tab));
        for c in "55".chars() {
            handle_key(&mut form, press(KeyCode::Char(c)));
        }
        assert_eq!(form.name, "Ana");
        assert_eq!(form.phone, "55");
    }

    #[test]
    fn submit_requires_mandatory_fields() {
        let mut form = LeadForm::create(&FixedCatalog).expect("form");
        assert_eq!(handle_key(&mut form, press(KeyCode::Enter)), FormAction::Continue);
        assert!(form.error.is_some());

        form.name = "Ana".to_string();
        form.phone = "55".to_string();
        assert_eq!(handle_key(&mut form, press(KeyCode::Enter)), FormAction::Submit);
    }

    #[test]
    fn vehicle_selector_cycles_catalog() {
        let mut form = LeadForm::create(&FixedCatalog).expect("form");
        form.focus = Field::Vehicle;
        handle_key(&mut form, press(KeyCode::Right));
        let draft = {
            form.name = "Ana".to_string();
            form.phone = "55".to_string();
            form.into_new_lead().expect("draft")
        };
        assert_eq!(draft.vehicle_interest, "Mustang");
    }

    #[test]
    fn edit_form_tolerates_stale_vehicle() {
        let lead = Lead {
            id: LeadId::from("ld-1"),
            name: "Ana".to_string(),
            phone: "55".to_string(),
            vehicle_interest: "Tsuru".to_string(),
            comment: Some("nota".to_string()),
            status: leadlane_core::model::Status::New,
            classification: None,
            created_at: chrono::Utc::now(),
        };
        let form = LeadForm::edit(&FixedCatalog, &lead).expect("form");
        assert_eq!(
            form.vehicles.get(form.vehicle_idx).map(|v| v.name.as_str()),
            Some("Tsuru")
        );
    }

    #[test]
    fn emptied_comment_clears_on_patch() {
        let lead = Lead {
            id: LeadId::from("ld-1"),
            name: "Ana".to_string(),
            phone: "55".to_string(),
            vehicle_interest: "Geely".to_string(),
            comment: Some("vieja nota".to_string()),
            status: leadlane_core::model::Status::New,
            classification: None,
            created_at: chrono::Utc::now(),
        };
        let mut form = LeadForm::edit(&FixedCatalog, &lead).expect("form");
        form.comment.clear();
        let patch = form.into_patch().expect("patch");
        assert_eq!(patch.comment, Some(None));
    }
}
