use anyhow::Result;
use clap::{Parser, ValueEnum};
use renban_core::{
    execute_plan, generate_plan, load_config, save_config, validate_template, AppConfig, CaseMode,
    ExecuteOptions, FileOutcome, OrderMode, Outcome, PlanOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;

const TEMPLATE_MANUAL: &str = "\
    テンプレート書式の概要

    TEMPLATE には番号ディレクティブを1つ以上含める必要があります。

    番号ディレクティブ(1つ以上必須):

      %d   10進数
      %x   16進数(小文字)
      %X   16進数(大文字)

      上記は % とディレクティブ文字の間に幅指定を書けます(例: %3d)。
      番号はこの幅までゼロで埋められます。

      %a   英字(小文字)
      %A   英字(大文字)

      英字は桁にゼロを持たない全単射26進数です(\"z\" の次は \"aa\")。
      幅指定の埋め文字は 'a' / 'A' になります。

    文字列ディレクティブ(任意):

      %f   元のファイル名(パス部分を除いたベース名)
      %bf  元のファイル名の語幹(%f から拡張子を除いたもの)
      %xf  元のファイル名の拡張子のみ(先頭のドットを含む)

    エスケープ:

      %%   リテラルの '%'

    その他の文字はそのままリテラルとして使われます。";

#[derive(Debug, Parser)]
#[command(name = "renban")]
#[command(version)]
#[command(about = "整列した順にファイル名をテンプレートの連番で一括リネームします")]
struct Cli {
    /// テンプレート書式の説明を表示して終了する
    #[arg(short = 'm', long)]
    man: bool,

    /// リネームに成功したファイルを表示する
    #[arg(short, long)]
    verbose: bool,

    /// 実際にはリネームせず、予定される結果だけを表示する
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// リネーム対象の集合外にある既存ファイルの上書きを許可する
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// 大文字小文字を区別して整列する(既定は区別しない)
    #[arg(short, long)]
    caseful: bool,

    /// 文字コード順で整列する(既定は数字を数値として扱う自然順)
    #[arg(short, long)]
    lexicographic: bool,

    /// 整列を逆順にして番号を振る
    #[arg(short, long)]
    reverse: bool,

    /// 開始番号(既定は設定ファイルの値、なければ1)
    #[arg(short, long, value_name = "NUM")]
    start: Option<i64>,

    /// 整列せず、与えられた順に番号を振る
    #[arg(short = 'U', long)]
    no_sort: bool,

    /// 結果の出力形式
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// 現在の整列・開始番号オプションを既定値として保存する
    #[arg(long)]
    save_defaults: bool,

    /// 新しいファイル名のテンプレート。書式は --man を参照
    #[arg(required_unless_present = "man")]
    template: Option<String>,

    /// リネームするファイル
    files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.man {
        println!("{TEMPLATE_MANUAL}");
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("renban: エラー: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Cli) -> Result<ExitCode> {
    let Some(template) = args.template else {
        anyhow::bail!("テンプレートが指定されていません");
    };
    if args.files.is_empty() {
        anyhow::bail!("リネームするファイルが指定されていません");
    }

    if let Err(err) = validate_template(&template) {
        eprintln!("renban: テンプレート '{template}' をコンパイルできません: {err}");
        return Ok(ExitCode::from(1));
    }

    let config = load_config()?;
    let start = args.start.unwrap_or(config.start_default);
    if start < 0 {
        anyhow::bail!("開始番号には0以上を指定してください: {start}");
    }

    let caseful = args.caseful || config.caseful_default;
    let lexicographic = args.lexicographic || config.lexicographic_default;
    let reverse = args.reverse || config.reverse_default;

    if args.save_defaults {
        save_config(&AppConfig {
            caseful_default: caseful,
            lexicographic_default: lexicographic,
            reverse_default: reverse,
            start_default: start,
        })?;
    }

    let options = PlanOptions {
        template,
        start,
        case: if caseful {
            CaseMode::Caseful
        } else {
            CaseMode::Caseless
        },
        order: if lexicographic {
            OrderMode::Lexicographic
        } else {
            OrderMode::Natural
        },
        descending: reverse,
        no_sort: args.no_sort,
    };

    let plan = generate_plan(&args.files, &options)?;
    let outcomes = execute_plan(
        &plan,
        &ExecuteOptions {
            overwrite: args.overwrite,
            dry_run: args.dry_run,
        },
    );

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => print_outcomes(&outcomes, args.verbose, args.dry_run),
    }

    Ok(ExitCode::SUCCESS)
}

fn print_outcomes(outcomes: &[FileOutcome], verbose: bool, dry_run: bool) {
    let mut renamed = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for entry in outcomes {
        match &entry.outcome {
            Outcome::Renamed => {
                renamed += 1;
                if verbose {
                    println!(
                        "{} -> {}",
                        entry.source_path.display(),
                        entry.target_path.display()
                    );
                }
            }
            Outcome::SkippedDryRun => {
                skipped += 1;
                println!(
                    "rename: '{}' -> '{}'",
                    entry.source_path.display(),
                    entry.target_path.display()
                );
            }
            Outcome::SkippedConflict => {
                skipped += 1;
                if verbose || dry_run {
                    println!(
                        "{} -> リネーム先が既に存在します",
                        entry.source_path.display()
                    );
                }
            }
            Outcome::FailedOs(reason) => {
                failed += 1;
                eprintln!("renban: {}: {}", entry.source_path.display(), reason);
            }
        }
    }

    if dry_run {
        eprintln!("dry-runモード: 実ファイルは変更していません。");
    } else {
        eprintln!("リネーム完了: {renamed}件 (スキップ {skipped}件, 失敗 {failed}件)");
    }
}
