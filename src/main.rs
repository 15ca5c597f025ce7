fn main() -> std::process::ExitCode {
    sysdrivers_lib::run()
}
