mod config_command;
mod send_command;
