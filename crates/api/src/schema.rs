use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor as _};
use tracing::info;

pub const CREATE_PATIENT_TABLE: &str = "
CREATE TABLE IF NOT EXISTS `patient` (
    `patientID` INT(11) AUTO_INCREMENT NOT NULL,
    `name` VARCHAR(100) NOT NULL,
    `dateOfBirth` DATETIME NOT NULL,
    CONSTRAINT `patient_patientID_pk` PRIMARY KEY (`patientID`)
)";

/// Creates the tables the API expects, over a short-lived admin connection.
pub async fn provision(options: &MySqlConnectOptions) -> Result<(), sqlx::Error> {
    let mut conn = MySqlConnection::connect_with(options).await?;
    conn.execute(CREATE_PATIENT_TABLE).await?;
    conn.close().await?;

    info!(table = "patient", "schema provisioned");
    Ok(())
}
