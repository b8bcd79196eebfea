//! Login screen shown until the auth service reports a session.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use leadlane_core::remote::{AuthService, Session};

/// Which input has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// Sign-up mode instead of sign-in.
    pub creating: bool,
}

/// Outcome of a key press on the login screen.
pub enum LoginAction {
    None,
    SignedIn(Session),
    Quit,
}

pub fn handle_key(form: &mut LoginForm, key: KeyEvent, auth: &dyn AuthService) -> LoginAction {
    match key.code {
        KeyCode::Esc => return LoginAction::Quit,
        KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => {
            form.focus = match form.focus {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
        }
        KeyCode::F(2) => form.creating = !form.creating,
        KeyCode::Enter => {
            if form.creating {
                if let Err(err) = auth.sign_up(&form.email, &form.password) {
                    form.error = Some(err.to_string());
                    return LoginAction::None;
                }
            }
            match auth.sign_in(&form.email, &form.password) {
                Ok(session) => return LoginAction::SignedIn(session),
                Err(err) => form.error = Some(err.to_string()),
            }
        }
        KeyCode::Backspace => {
            match form.focus {
                LoginField::Email => form.email.pop(),
                LoginField::Password => form.password.pop(),
            };
        }
        KeyCode::Char(c) => match form.focus {
            LoginField::Email => form.email.push(c),
            LoginField::Password => form.password.push(c),
        },
        _ => {}
    }
    LoginAction::None
}

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

pub fn render(frame: &mut Frame<'_>, form: &LoginForm) {
    let area = centered(frame.area(), 46, 10);
    let title = if form.creating {
        " Crear Cuenta "
    } else {
        " Iniciar Sesión "
    };

    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), style),
            Span::raw(if focused { "▏" } else { "" }),
        ])
    };

    let masked = "•".repeat(form.password.chars().count());
    let mut lines = vec![
        field("Correo", &form.email, form.focus == LoginField::Email),
        field("Contraseña", &masked, form.focus == LoginField::Password),
        Line::raw(""),
        Line::styled(
            "Enter entrar · F2 crear cuenta · Esc salir",
            Style::default().fg(Color::DarkGray),
        ),
        Line::styled(
            "demo: demo@leadlane.mx / demo123",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    }

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadlane_core::remote::RemoteError;

    struct OneUser;

    impl AuthService for OneUser {
        fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
            if email == "a@b.mx" && password == "pw" {
                Ok(Session {
                    user_id: "u1".to_string(),
                    email: email.to_string(),
                })
            } else {
                Err(RemoteError::Rejected {
                    reason: "credenciales inválidas".to_string(),
                })
            }
        }

        fn sign_up(&self, _email: &str, _password: &str) -> Result<(), RemoteError> {
            Ok(())
        }

        fn sign_out(&self) {}

        fn session(&self) -> Option<Session> {
            None
        }
    }

    fn type_text(form: &mut LoginForm, auth: &dyn AuthService, text: &str) {
        for c in text.chars() {
            let _ = handle_key(form, KeyEvent::from(KeyCode::Char(c)), auth);
        }
    }

    #[test]
    fn successful_login_reports_session() {
        let mut form = LoginForm::default();
        type_text(&mut form, &OneUser, "a@b.mx");
        let _ = handle_key(&mut form, KeyEvent::from(KeyCode::Tab), &OneUser);
        type_text(&mut form, &OneUser, "pw");
        match handle_key(&mut form, KeyEvent::from(KeyCode::Enter), &OneUser) {
            LoginAction::SignedIn(session) => assert_eq!(session.email, "a@b.mx"),
            _ => panic!("expected sign-in"),
        }
    }

    #[test]
    fn bad_credentials_surface_inline() {
        let mut form = LoginForm::default();
        type_text(&mut form, &OneUser, "a@b.mx");
        let _ = handle_key(&mut form, KeyEvent::from(KeyCode::Enter), &OneUser);
        assert!(form.error.as_deref().is_some_and(|e| e.contains("inválidas")));
    }
}
