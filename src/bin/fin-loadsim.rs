use fin_loadsim::config::{self, Command, FormatArg};
use fin_loadsim::error::Result;
use fin_loadsim::jitter::build_jitter;
use fin_loadsim::output::{
    self, ChartFormatter, Formatter, HumanFormatter, JsonFormatter, Report, SummaryFormatter,
};
use fin_loadsim::persist;
use fin_loadsim::telemetry;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = config::parse_args()?;
    telemetry::init(&args.log_level)?;
    let simulator = config::build_simulator(args.config.as_deref())?;

    match args.command {
        Command::ListApis => print!("{}", output::format_apis(simulator.catalog())),
        Command::ListScenarios => print!(
            "{}",
            output::format_scenarios(simulator.presets(), simulator.catalog())
        ),
        Command::ShowConfig => print!("{}", output::format_config(&simulator)),
        Command::Run(run_args) => {
            let plan = config::build_run(&run_args, &simulator)?;
            let mut jitter = build_jitter(plan.jitter, plan.seed);
            let result = simulator.run(plan.users, &plan.distribution, jitter.as_mut())?;
            if let Some(path) = &run_args.save {
                persist::save_result(path, &result)?;
            }
            let jitter_label = plan.jitter.label_with_seed(plan.seed);
            let report = Report::new(plan.label, jitter_label, result, simulator.catalog());
            render(&report, run_args.format);
        }
        Command::Compare(compare_args) => {
            let results = simulator.compare(&compare_args.scenarios, compare_args.seed)?;
            print!("{}", output::format_comparison(&results));
        }
        Command::Report(report_args) => {
            let result = persist::load_result(&report_args.input)?;
            let label = report_args.input.display().to_string();
            let report = Report::new(label, "saved", result, simulator.catalog());
            render(&report, report_args.format);
        }
    }

    Ok(())
}

fn render(report: &Report, format: FormatArg) {
    let formatter = formatter_for(&format);
    print!("{}", formatter.write(report));
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
        FormatArg::Chart => Box::new(ChartFormatter),
    }
}
