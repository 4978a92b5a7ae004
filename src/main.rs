fn main() -> std::process::ExitCode {
    ts_organizer_lib::run()
}
