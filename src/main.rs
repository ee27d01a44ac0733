use clap::Parser;
use rbi_damage_toolbox::{app, cli::Cli};

/// 프로그램의 엔트리 포인트. 인자를 해석한 뒤 명령을 실행한다.
fn main() -> std::process::ExitCode {
    if let Err(err) = try_run() {
        eprintln!("오류: {err}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn try_run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    app::run(&cli)?;
    Ok(())
}
