//! User and installation queries.

use sqlx::FromRow;

use crate::domain::Settings;

use super::{Store, StoreError};

const INSTALLATION_COLUMNS: &str = "id, trmnl_installation_id, install_state, user_id, \
     access_token, bus_stop, bus_direction, train_station, train_destination, \
     min_train_time, app_id, app_key";

/// One installation of the plugin, pending or complete.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Installation {
    pub id: i64,
    pub trmnl_installation_id: Option<String>,
    pub install_state: Option<String>,
    pub user_id: Option<i64>,
    pub access_token: Option<String>,

    pub bus_stop: Option<String>,
    pub bus_direction: Option<String>,
    pub train_station: Option<String>,
    pub train_destination: Option<String>,
    pub min_train_time: Option<i64>,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
}

impl Installation {
    /// The user-editable part of the row.
    pub fn settings(&self) -> Settings {
        Settings {
            bus_stop: self.bus_stop.clone(),
            bus_direction: self.bus_direction.clone(),
            train_station: self.train_station.clone(),
            train_destination: self.train_destination.clone(),
            min_train_time: self.min_train_time,
            app_id: self.app_id.clone(),
            app_key: self.app_key.clone(),
        }
    }
}

impl Store {
    /// Insert a pending installation carrying only its OAuth state.
    pub async fn create_pending(&self, state: &str) -> Result<Installation, StoreError> {
        let sql = format!(
            "INSERT INTO installations (install_state) VALUES (?) RETURNING {INSTALLATION_COLUMNS}"
        );
        let installation = sqlx::query_as::<_, Installation>(&sql)
            .bind(state)
            .fetch_one(self.pool())
            .await?;
        Ok(installation)
    }

    pub async fn find_by_state(&self, state: &str) -> Result<Option<Installation>, StoreError> {
        let sql = format!("SELECT {INSTALLATION_COLUMNS} FROM installations WHERE install_state = ?");
        let installation = sqlx::query_as::<_, Installation>(&sql)
            .bind(state)
            .fetch_optional(self.pool())
            .await?;
        Ok(installation)
    }

    pub async fn find_by_access_token(
        &self,
        token: &str,
    ) -> Result<Option<Installation>, StoreError> {
        let sql = format!("SELECT {INSTALLATION_COLUMNS} FROM installations WHERE access_token = ?");
        let installation = sqlx::query_as::<_, Installation>(&sql)
            .bind(token)
            .fetch_optional(self.pool())
            .await?;
        Ok(installation)
    }

    /// Attach an account and access token to the pending installation
    /// holding `state`, creating the user on first sight.
    ///
    /// Returns `None` if no installation holds `state`.
    pub async fn attach_user(
        &self,
        state: &str,
        trmnl_user_id: &str,
        access_token: &str,
    ) -> Result<Option<Installation>, StoreError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("INSERT INTO users (trmnl_id) VALUES (?) ON CONFLICT(trmnl_id) DO NOTHING")
            .bind(trmnl_user_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "UPDATE installations \
             SET user_id = (SELECT id FROM users WHERE trmnl_id = ?), access_token = ? \
             WHERE install_state = ? \
             RETURNING {INSTALLATION_COLUMNS}"
        );
        let installation = sqlx::query_as::<_, Installation>(&sql)
            .bind(trmnl_user_id)
            .bind(access_token)
            .bind(state)
            .fetch_optional(&mut *tx)
            .await?;

        // Don't leave an orphaned user behind for an unknown state
        if installation.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(installation)
    }

    /// Record the platform's installation id and clear the OAuth state.
    ///
    /// Returns `false` if no installation holds `state`.
    pub async fn complete_install(
        &self,
        state: &str,
        trmnl_installation_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE installations SET trmnl_installation_id = ?, install_state = NULL \
             WHERE install_state = ?",
        )
        .bind(trmnl_installation_id)
        .bind(state)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` if no installation has that id.
    pub async fn delete_by_installation_id(
        &self,
        trmnl_installation_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM installations WHERE trmnl_installation_id = ?")
            .bind(trmnl_installation_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the user-editable settings of an installation.
    pub async fn update_settings(&self, id: i64, settings: &Settings) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE installations SET bus_stop = ?, bus_direction = ?, train_station = ?, \
             train_destination = ?, min_train_time = ?, app_id = ?, app_key = ? WHERE id = ?",
        )
        .bind(&settings.bus_stop)
        .bind(&settings.bus_direction)
        .bind(&settings.train_station)
        .bind(&settings.train_destination)
        .bind(settings.min_train_time)
        .bind(&settings.app_id)
        .bind(&settings.app_key)
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
