use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, instrument, trace};

use crate::domain::{AppConfig, InputMode, Message};
use crate::inputter::{InputEvent, Inputter};
use crate::pages::{DetailPage, EmployeesPage, FormPage, PageContext};
use crate::router::{Route, Router};
use crate::table::row::csv_row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Quitting,
}

pub struct Model {
    config: AppConfig,
    pub status: Status,
    router: Router,
    employees: EmployeesPage,
    detail: Option<DetailPage>,
    form: Option<FormPage>,
    page_prompt: Option<Inputter>,
    show_help: bool,
    status_message: String,
    last_status_message_update: Instant,
    ctx: PageContext,
}

impl Model {
    pub fn init(config: &AppConfig, ctx: PageContext) -> Self {
        let route = config.start_route();
        let mut model = Self {
            config: config.clone(),
            status: Status::Ready,
            router: Router::new(route.clone()),
            employees: EmployeesPage::new(config),
            detail: None,
            form: None,
            page_prompt: None,
            show_help: false,
            status_message: "Started staffview!".to_string(),
            last_status_message_update: Instant::now(),
            ctx,
        };
        model.mount(&route);
        model
    }

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    pub fn employees(&self) -> &EmployeesPage {
        &self.employees
    }

    pub fn detail(&self) -> Option<&DetailPage> {
        self.detail.as_ref()
    }

    pub fn form(&self) -> Option<&FormPage> {
        self.form.as_ref()
    }

    /// Page number being typed after `p`, if the prompt is open.
    pub fn page_prompt(&self) -> Option<&Inputter> {
        self.page_prompt.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_status_message_update(&self) -> Instant {
        self.last_status_message_update
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn input_mode(&self) -> InputMode {
        if self.show_help {
            InputMode::Help
        } else if *self.route() == Route::Employees && self.employees.pending_delete().is_some() {
            InputMode::ConfirmDelete
        } else if self.form.is_some() || self.page_prompt.is_some() {
            InputMode::Text
        } else {
            InputMode::Normal
        }
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    #[instrument(skip_all, fields(route = %self.router.current()))]
    pub fn update(&mut self, message: Message) {
        trace!("Update {message:?}");
        match message {
            Message::Quit => self.quit(),
            Message::Help => self.show_help = true,
            Message::Exit => self.exit(),
            Message::Back => self.back(),
            Message::Navigate(route) => self.navigate(route),

            Message::EmployeesLoaded { generation, result } => {
                if self.employees.apply_loaded(generation, result) {
                    let count = self.employees.employees().len();
                    if !self.employees.state().is_loading() && count > 0 {
                        self.set_status_message(format!("{count} employees"));
                    }
                }
            }
            Message::EmployeeDeleted { id, result } => {
                let status = match self.employees.apply_deleted(id, result) {
                    Ok(status) | Err(status) => status,
                };
                self.set_status_message(status);
            }
            Message::EmployeeLoaded { generation, result } => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.apply_loaded(generation, result);
                }
            }
            Message::EmployeeCreated { generation, result } => {
                let created = self
                    .form
                    .as_mut()
                    .and_then(|form| form.apply_created(generation, result));
                if created == Some(true) {
                    self.set_status_message("Employee created");
                    self.replace(Route::Employees);
                }
            }

            Message::EditRequested(employee) => match employee.id {
                Some(id) => self.navigate(Route::EditEmployee(id)),
                None => debug!("Employee without id cannot be opened"),
            },
            Message::DeleteRequested(employee) => {
                self.employees.request_delete(employee);
            }
            Message::Confirm => {
                self.employees.confirm_delete(&self.ctx);
            }
            Message::Decline => self.employees.decline_delete(),
            Message::Add => self.navigate(Route::CreateEmployee),
            Message::Retry => self.retry(),
            Message::RawKey(key) if self.page_prompt.is_some() => self.handle_page_prompt(key),
            Message::RawKey(key) => {
                let next = self
                    .form
                    .as_mut()
                    .and_then(|form| form.handle_key(key, &self.ctx));
                if let Some(next) = next {
                    self.update(next);
                }
            }

            table_message => {
                if *self.route() == Route::Employees {
                    self.update_table(table_message);
                }
            }
        }
    }

    fn update_table(&mut self, message: Message) {
        let action = match message {
            Message::Edit => self.employees.table().edit_selected(self.employees.employees()),
            Message::Delete => self.employees.table().delete_selected(self.employees.employees()),
            Message::CopyRow => {
                self.copy_table_row();
                None
            }
            Message::GoToPage => {
                if self.employees.state().is_ready() {
                    self.page_prompt = Some(Inputter::default());
                }
                None
            }
            other => {
                self.move_in_table(other);
                None
            }
        };
        if let Some(action) = action {
            self.update(action);
        }
    }

    fn move_in_table(&mut self, message: Message) {
        let count = self.employees.employees().len();
        let table = self.employees.table_mut();
        match message {
            Message::MoveUp => table.select_prev_row(),
            Message::MoveDown => table.select_next_row(count),
            Message::MoveLeft => table.focus_prev_column(),
            Message::MoveRight => table.focus_next_column(),
            Message::Sort => {
                table.sort_focused();
            }
            Message::NextPage => {
                table.next_page(count);
            }
            Message::PrevPage => {
                table.prev_page();
            }
            Message::FirstPage => {
                table.first_page();
            }
            Message::LastPage => {
                table.last_page(count);
            }
            Message::SetPage(page) => {
                if !table.set_page(page, count) {
                    let pages = table.total_pages(count);
                    self.set_status_message(format!("No page {page}, pages 1 to {pages}"));
                }
            }
            other => trace!("Ignoring {other:?} on the employees table"),
        }
    }

    fn handle_page_prompt(&mut self, key: KeyEvent) {
        let Some(prompt) = self.page_prompt.as_mut() else {
            return;
        };
        match prompt.read(key) {
            InputEvent::Submitted => {
                let typed = prompt.value().trim().to_string();
                self.page_prompt = None;
                match typed.parse::<usize>() {
                    Ok(page) => self.update(Message::SetPage(page)),
                    Err(_) if typed.is_empty() => {}
                    Err(_) => self.set_status_message(format!("Not a page number: {typed}")),
                }
            }
            InputEvent::Cancelled => self.page_prompt = None,
            _ => {}
        }
    }

    // -------------------------------- Routing ----------------------------- //

    fn navigate(&mut self, route: Route) {
        let current = self.route().clone();
        if self.router.navigate(route.clone()).is_some() {
            self.unmount(&current);
            self.mount(&route);
        }
    }

    fn replace(&mut self, route: Route) {
        let previous = self.router.replace(route.clone());
        self.unmount(&previous);
        self.mount(&route);
    }

    fn back(&mut self) {
        if let Some(previous) = self.router.back() {
            self.unmount(&previous);
            let route = self.route().clone();
            self.mount(&route);
        }
    }

    fn exit(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else if self.employees.pending_delete().is_some() {
            self.employees.decline_delete();
        } else {
            self.back();
        }
    }

    fn mount(&mut self, route: &Route) {
        info!("Mounting {route}");
        match route {
            Route::Employees => self.employees.mount(&self.ctx),
            Route::EditEmployee(id) => {
                let mut detail = DetailPage::new(*id, self.config.min_loading());
                detail.mount(&self.ctx);
                self.detail = Some(detail);
            }
            Route::CreateEmployee => self.form = Some(FormPage::new()),
            Route::Home | Route::Departments => {}
        }
    }

    fn unmount(&mut self, route: &Route) {
        debug!("Unmounting {route}");
        match route {
            Route::Employees => {
                self.page_prompt = None;
                self.employees.unmount();
            }
            Route::EditEmployee(_) => {
                if let Some(mut detail) = self.detail.take() {
                    detail.unmount();
                }
            }
            Route::CreateEmployee => {
                if let Some(mut form) = self.form.take() {
                    form.unmount();
                }
            }
            Route::Home | Route::Departments => {}
        }
    }

    fn retry(&mut self) {
        match self.route() {
            Route::Employees => self.employees.fetch(&self.ctx),
            Route::EditEmployee(_) => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.fetch(&self.ctx);
                }
            }
            _ => {}
        }
    }

    fn copy_table_row(&mut self) {
        let employees = self.employees.employees();
        let table = self.employees.table();
        let Some(employee) = table.selected(employees) else {
            return;
        };
        let row_content = csv_row(table.columns(), employee);
        trace!("Row content: {row_content}");

        let copied = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(row_content));
        match copied {
            Ok(_) => self.set_status_message("Copied row to clipboard"),
            Err(e) => {
                debug!("Error copying to clipboard: {e:?}");
                self.set_status_message("Clipboard is not available");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::api::fake::{FakeApi, employee};
    use crate::pages::LoadState;
    use crate::pages::testing::context;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn config(route: &str) -> AppConfig {
        AppConfig {
            route: route.to_string(),
            min_loading_ms: 0,
            ..AppConfig::default()
        }
    }

    async fn drain(model: &mut Model, receiver: &mut UnboundedReceiver<Message>) {
        let message = receiver.recv().await.expect("task result");
        model.update(message);
    }

    fn api() -> Arc<FakeApi> {
        Arc::new(FakeApi::with_employees(
            (1..=8).map(|id| employee(id, &format!("Surname{id}"))).collect(),
        ))
    }

    #[tokio::test]
    async fn employees_route_loads_on_start() {
        let (ctx, mut receiver) = context(api());
        let mut model = Model::init(&config("/employees"), ctx);
        assert!(model.employees().state().is_loading());

        drain(&mut model, &mut receiver).await;
        assert_eq!(model.employees().employees().len(), 8);
        assert_eq!(model.status_message(), "8 employees");
    }

    #[tokio::test]
    async fn home_route_loads_nothing() {
        let api = api();
        let (ctx, _receiver) = context(api.clone());
        let model = Model::init(&config("/nowhere"), ctx);

        assert_eq!(model.route(), &Route::Home);
        assert_eq!(model.input_mode(), InputMode::Normal);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn edit_opens_detail_and_back_returns() {
        let (ctx, mut receiver) = context(api());
        let mut model = Model::init(&config("/employees"), ctx);
        drain(&mut model, &mut receiver).await;

        model.update(Message::MoveDown);
        model.update(Message::Edit);
        assert_eq!(model.route(), &Route::EditEmployee(2));
        drain(&mut model, &mut receiver).await;
        assert!(matches!(model.detail().map(|d| d.state()), Some(LoadState::Ready(e)) if e.id == Some(2)));

        model.update(Message::Exit);
        assert_eq!(model.route(), &Route::Employees);
        assert!(model.detail().is_none());
        drain(&mut model, &mut receiver).await;
        assert_eq!(model.employees().employees().len(), 8);
    }

    #[tokio::test]
    async fn delete_flow_through_popup() {
        let api = api();
        let (ctx, mut receiver) = context(api.clone());
        let mut model = Model::init(&config("/employees"), ctx);
        drain(&mut model, &mut receiver).await;

        model.update(Message::Delete);
        assert_eq!(model.input_mode(), InputMode::ConfirmDelete);
        model.update(Message::Decline);
        assert_eq!(model.input_mode(), InputMode::Normal);

        model.update(Message::Delete);
        model.update(Message::Confirm);
        drain(&mut model, &mut receiver).await;

        assert_eq!(model.employees().employees().len(), 7);
        assert_eq!(model.status_message(), "Deleted employee 1");
        assert_eq!(
            api.calls(),
            vec!["GET /employees/all", "DELETE /employees/delete/1"]
        );
    }

    #[tokio::test]
    async fn create_returns_to_refreshed_list() {
        let api = api();
        let (ctx, mut receiver) = context(api.clone());
        let mut model = Model::init(&config("/"), ctx);
        model.update(Message::Navigate(Route::Employees));
        drain(&mut model, &mut receiver).await;

        model.update(Message::Add);
        assert_eq!(model.input_mode(), InputMode::Text);
        for (idx, value) in ["Anna", "", "Ivanova", "7", "8", "9"].iter().enumerate() {
            if idx > 0 {
                model.update(Message::RawKey(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
            }
            for chr in value.chars() {
                model.update(Message::RawKey(KeyEvent::new(KeyCode::Char(chr), KeyModifiers::NONE)));
            }
        }
        model.update(Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        drain(&mut model, &mut receiver).await;

        assert_eq!(model.route(), &Route::Employees);
        assert!(model.form().is_none());
        drain(&mut model, &mut receiver).await;
        assert_eq!(model.employees().employees().len(), 9);

        model.update(Message::Back);
        assert_eq!(model.route(), &Route::Home);
    }

    #[tokio::test]
    async fn table_keys_only_act_on_employees() {
        let (ctx, mut receiver) = context(api());
        let mut model = Model::init(&config("/employees"), ctx);
        drain(&mut model, &mut receiver).await;

        model.update(Message::NextPage);
        assert_eq!(model.employees().table().page(), 2);
        model.update(Message::Sort);
        assert_eq!(model.employees().table().sort_state().key.as_deref(), Some("surname"));

        model.update(Message::Navigate(Route::Departments));
        model.update(Message::PrevPage);
        assert_eq!(model.employees().table().page(), 2);
    }

    fn type_keys(model: &mut Model, text: &str) {
        for chr in text.chars() {
            model.update(Message::RawKey(KeyEvent::new(KeyCode::Char(chr), KeyModifiers::NONE)));
        }
    }

    fn twelve_employees() -> Arc<FakeApi> {
        Arc::new(FakeApi::with_employees(
            (1..=12).map(|id| employee(id, &format!("Surname{id:02}"))).collect(),
        ))
    }

    #[tokio::test]
    async fn page_prompt_jumps_to_typed_page() {
        let (ctx, mut receiver) = context(twelve_employees());
        let mut model = Model::init(&config("/employees"), ctx);
        drain(&mut model, &mut receiver).await;

        model.update(Message::GoToPage);
        assert_eq!(model.input_mode(), InputMode::Text);
        type_keys(&mut model, "3");
        assert_eq!(model.page_prompt().map(|p| p.value()), Some("3"));
        model.update(Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));

        assert!(model.page_prompt().is_none());
        assert_eq!(model.input_mode(), InputMode::Normal);
        assert_eq!(model.employees().table().page(), 3);
    }

    #[tokio::test]
    async fn page_prompt_rejects_pages_out_of_range() {
        let (ctx, mut receiver) = context(twelve_employees());
        let mut model = Model::init(&config("/employees"), ctx);
        drain(&mut model, &mut receiver).await;
        model.update(Message::NextPage);

        model.update(Message::GoToPage);
        type_keys(&mut model, "9");
        model.update(Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(model.employees().table().page(), 2);
        assert_eq!(model.status_message(), "No page 9, pages 1 to 3");

        model.update(Message::GoToPage);
        type_keys(&mut model, "x");
        model.update(Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(model.status_message(), "Not a page number: x");

        model.update(Message::GoToPage);
        type_keys(&mut model, "1");
        model.update(Message::RawKey(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(model.page_prompt().is_none());
        assert_eq!(model.route(), &Route::Employees);
        assert_eq!(model.employees().table().page(), 2);
    }

    #[tokio::test]
    async fn returning_to_employees_resets_the_table() {
        let (ctx, mut receiver) = context(twelve_employees());
        let mut model = Model::init(&config("/employees"), ctx);
        drain(&mut model, &mut receiver).await;
        model.update(Message::MoveRight);
        model.update(Message::Sort);
        model.update(Message::Sort);
        model.update(Message::LastPage);

        model.update(Message::Navigate(Route::Home));
        model.update(Message::Navigate(Route::Employees));
        drain(&mut model, &mut receiver).await;

        let table = model.employees().table();
        assert_eq!(table.sort_state().key, None);
        assert_eq!(table.page(), 1);
        assert_eq!(table.focused_column(), 0);
    }

    #[tokio::test]
    async fn help_popup_closes_first() {
        let (ctx, _receiver) = context(api());
        let mut model = Model::init(&config("/departments"), ctx);
        model.update(Message::Navigate(Route::Home));

        model.update(Message::Help);
        assert_eq!(model.input_mode(), InputMode::Help);
        model.update(Message::Exit);
        assert_eq!(model.route(), &Route::Home);
        model.update(Message::Exit);
        assert_eq!(model.route(), &Route::Departments);

        model.update(Message::Quit);
        assert_eq!(model.status, Status::Quitting);
    }
}
