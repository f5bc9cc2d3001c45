/// Top-level board controller.
///
/// Owns the latest host inputs and the optimistic overlay: every data,
/// config, or settings change rebuilds the authoritative model from scratch
/// and hands it to the reconciler; user actions become an overlay plus a
/// write-back through the host sink. Rendering reads `display()` and never
/// mutates anything; the display model is only ever replaced wholesale.
use std::sync::Arc;

use crate::builder::{self, BuildError};
use crate::columns::ColumnMap;
use crate::config::ElementConfig;
use crate::dates;
use crate::host::{HostError, HostWriteback};
use crate::reconcile::Reconciler;
use crate::settings::Settings;
use crate::types::{CellValue, ElementData, KanbanModel, KanbanStats};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("card not found: {id}")]
    UnknownCard { id: usize },

    /// Surfaced to the user verbatim; the optimistic overlay has already
    /// been rolled back when this is returned.
    #[error("failed to update card: {0}")]
    WriteBack(#[from] HostError),
}

/// Which configured date column a date edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRole {
    Start,
    End,
}

pub struct BoardController {
    sink: Arc<dyn HostWriteback>,
    config: ElementConfig,
    settings: Settings,
    columns: ColumnMap,
    data: Option<ElementData>,
    authoritative: Option<KanbanModel>,
    build_error: Option<BuildError>,
    reconciler: Reconciler,
}

impl BoardController {
    pub fn new(sink: Arc<dyn HostWriteback>) -> Self {
        Self {
            sink,
            config: ElementConfig::default(),
            settings: Settings::default(),
            columns: ColumnMap::new(),
            data: None,
            authoritative: None,
            build_error: None,
            reconciler: Reconciler::new(),
        }
    }

    /// New panel configuration. Re-parses the embedded settings JSON and
    /// rebuilds.
    pub fn set_config(&mut self, config: ElementConfig) {
        self.settings = Settings::from_json(config.settings_json.as_deref().unwrap_or(""));
        self.config = config;
        self.rebuild();
    }

    /// New column metadata from the host element.
    pub fn set_columns(&mut self, columns: ColumnMap) {
        self.columns = columns;
        self.rebuild();
    }

    /// A fresh data push from the host. Rebuilding feeds the reconciler, so
    /// a push that reflects an in-flight move clears its overlay.
    pub fn set_data(&mut self, data: ElementData) {
        self.data = Some(data);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let Some(data) = &self.data else {
            self.authoritative = None;
            self.build_error = None;
            return;
        };
        match builder::build(data, &self.config, &self.settings, &self.columns) {
            Ok(model) => {
                self.reconciler.reconcile(&model);
                self.build_error = None;
                self.authoritative = Some(model);
            }
            Err(e) => {
                log::warn!("[kanview.controller.build] Cannot build board model: {}", e);
                self.build_error = Some(e);
                self.authoritative = None;
                self.reconciler.clear();
            }
        }
    }

    /// The model to render: overlay while a mutation is in flight, else the
    /// authoritative model. `None` means "cannot render"; check
    /// [`BoardController::build_error`] for the configuration prompt.
    pub fn display(&self) -> Option<&KanbanModel> {
        self.authoritative
            .as_ref()
            .map(|auth| self.reconciler.display(auth))
    }

    pub fn build_error(&self) -> Option<&BuildError> {
        self.build_error.as_ref()
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> KanbanStats {
        KanbanStats::for_model(self.display())
    }

    /// Expire the confirmation window if it has elapsed. The embedding app
    /// calls this from its timer.
    pub fn tick(&mut self) {
        self.reconciler.tick();
    }

    /// Move a card to another board: apply the overlay immediately, then
    /// write the row id and new category through the host sink and fire the
    /// row-update trigger. A sink rejection rolls the overlay back and
    /// returns the message for display; there is no retry.
    pub async fn move_card(
        &mut self,
        card_id: usize,
        target_board_name: &str,
    ) -> Result<(), ControllerError> {
        if !self.config.enable_drag_drop {
            log::debug!("[kanview.controller.move] Drag & drop disabled, ignoring move");
            return Ok(());
        }
        let auth = self
            .authoritative
            .as_ref()
            .ok_or(ControllerError::UnknownCard { id: card_id })?;
        let row_id = self
            .reconciler
            .display(auth)
            .card_by_id(card_id)
            .map(|card| card.row_id.clone())
            .ok_or(ControllerError::UnknownCard { id: card_id })?;

        self.reconciler.apply_move(auth, card_id, target_board_name);
        log::info!(
            "[kanview.controller.move] Card {} -> {:?} (row id {:?})",
            card_id,
            target_board_name,
            row_id
        );

        let category = CellValue::Text(target_board_name.to_string());
        let result = self.push_update(&row_id, Some(&category), None).await;
        self.finish_write(result)
    }

    /// Edit a configured date column on a card. Unparsable input is "no
    /// change": the host variable is simply not set. A parsed date marks
    /// the card updating (no field overlay: date cells are host-managed)
    /// and goes through the same write/trigger sequence as a move.
    pub async fn edit_card_date(
        &mut self,
        card_id: usize,
        role: DateRole,
        raw: &str,
    ) -> Result<(), ControllerError> {
        let Some(date) = dates::parse_date_str(raw) else {
            log::debug!(
                "[kanview.controller.date] Unparsable date input {:?}, no change",
                raw
            );
            return Ok(());
        };
        let auth = self
            .authoritative
            .as_ref()
            .ok_or(ControllerError::UnknownCard { id: card_id })?;
        let row_id = self
            .reconciler
            .display(auth)
            .card_by_id(card_id)
            .map(|card| card.row_id.clone())
            .ok_or(ControllerError::UnknownCard { id: card_id })?;

        self.reconciler.mark_updating(auth, card_id);

        let variable = match role {
            DateRole::Start => self.config.start_date_variable.clone(),
            DateRole::End => self.config.end_date_variable.clone(),
        };
        let value = CellValue::Text(dates::format_for_host(date));
        let result = self
            .push_update(&row_id, None, variable.as_deref().map(|name| (name, &value)))
            .await;
        self.finish_write(result)
    }

    /// The shared write sequence: id variable, then the changed value's
    /// variable, then the row-update trigger. Unassigned variable or trigger
    /// slots are skipped; the host has nothing wired there.
    async fn push_update(
        &self,
        row_id: &CellValue,
        category: Option<&CellValue>,
        date: Option<(&str, &CellValue)>,
    ) -> Result<(), HostError> {
        if let Some(name) = &self.config.selected_id {
            self.sink.set_variable(name, row_id).await?;
        }
        if let Some(value) = category {
            if let Some(name) = &self.config.selected_category {
                self.sink.set_variable(name, value).await?;
            }
        }
        if let Some((name, value)) = date {
            self.sink.set_variable(name, value).await?;
        }
        if let Some(name) = &self.config.update_row {
            self.sink.trigger_action(name).await?;
        }
        Ok(())
    }

    fn finish_write(&mut self, result: Result<(), HostError>) -> Result<(), ControllerError> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("[kanview.controller.write] Write-back failed: {}", e);
                self.reconciler.clear();
                Err(ControllerError::WriteBack(e))
            }
        }
    }
}
