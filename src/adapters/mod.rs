//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements         | Connects to              |
//! |---------------|--------------------|--------------------------|
//! | `hardware`    | SensorPort         | DHT11 ×2 (bit-banged)    |
//! |               | DistancePort       | HC-SR04 rangefinder      |
//! |               | RelayPort          | Active-low relay GPIO    |
//! |               | DisplayPort        | 16×2 LCD over I²C        |
//! | `modem`       | MessagingPort      | SIM800L over UART2       |
//! |               | TimeSourcePort     | Network clock (AT+CCLK)  |
//! | `sd_journal`  | LogPort            | FAT volume on SD card    |
//! | `config_file` | ConfigPort         | JSON file on SD card     |
//! | `log_sink`    | EventSink          | Serial log output        |
//! | `time`        | -                   | ESP32 system timer       |

pub mod config_file;
pub mod hardware;
pub mod log_sink;
pub mod modem;
pub mod sd_journal;
pub mod time;
